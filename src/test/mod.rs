//! Crafted-input builders shared by the unit tests.


pub use pe::PeBuilder;
pub use shelllink::LinkBuilder;
