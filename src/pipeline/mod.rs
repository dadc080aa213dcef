pub(crate) mod io;
pub(crate) mod layer;
pub(crate) mod orchestrator;
