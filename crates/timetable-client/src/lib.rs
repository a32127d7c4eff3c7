//! `timetable-client` — fetches week journals and resolves the next school day.
//!
//! [`source::JournalSource`] is the seam between the resolver and the network;
//! [`beste::BesteSchuleClient`] is the HTTPS implementation and tests plug in
//! in-memory sources. [`resolver::Resolver`] walks forward from a start date
//! over weekends and days without published lessons.

pub mod beste;
pub mod extract;
pub mod resolver;
pub mod source;

pub use beste::BesteSchuleClient;
pub use resolver::Resolver;
pub use source::{JournalSource, SourceError};
