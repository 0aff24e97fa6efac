//! Concrete [`crate::script::Dialect`] implementations. The spec's Open
//! Question on how to represent a second dialect is resolved here: rather
//! than a config flag threaded through every command group, each dialect is
//! a small stateless type and the engine just holds a `Box<dyn Dialect>`
//! chosen at construction time.

pub mod sim7000;
pub mod sim800;

pub use sim7000::Sim7000;
pub use sim800::Sim800;
