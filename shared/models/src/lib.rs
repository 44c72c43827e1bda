//! # CadBom Domain Models
//!
//! Value types shared by the BOM toolkit.
//!
//! ## Key Models
//!
//! - **AttrValue**: a loosely-typed property value read off a drawing object;
//!   mappings support key lookup, structured objects support named-field read
//! - **CadObject**: structured drawing object with (possibly nested) named fields
//! - **ExtractedProperties**: logical properties resolved from one object
//! - **BomRow**: one aggregated bill-of-materials line with its quantity

pub mod value;
pub mod record;


pub use value::*;
pub use record::*;
