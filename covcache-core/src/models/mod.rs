pub mod alignment;
pub mod cigar;
pub mod feature;
pub mod interval;
pub mod item;

// re-export for cleaner imports
pub use self::alignment::{Alignment, Strand};
pub use self::cigar::{CigarOp, CigarOpKind, parse_cigar, query_length, reference_length};
pub use self::feature::Feature;
pub use self::interval::ContigInterval;
pub use self::item::CoverageItem;
