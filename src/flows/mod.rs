mod assistant;
pub mod fsm;
mod guard;
pub mod observer;
mod pipeline;
mod relevance;
mod scene;

pub use assistant::*;
pub use fsm::{FlowMachine, FlowSignal, FlowState, Outcome};
pub use guard::guard;
pub use observer::{EventLevel, FlowEvent, FlowObserver, TracingObserver};
pub use pipeline::{Flow, FlowKind, FlowRunner};
pub use relevance::*;
pub use scene::*;
