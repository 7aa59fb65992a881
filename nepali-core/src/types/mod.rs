pub mod object;

pub use object::{Function, HashKey, HashObject, HashPair, Object, ObjectType};
