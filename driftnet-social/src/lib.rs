//! Social-media search integrations for the driftnet workspace.
//!
//! One provider today: Twitter/X via a paginated keyword-search API. The
//! crate owns the wire types, the canonical post representation, and the
//! time-budgeted pagination loop that ties them together.

pub mod twitter;
