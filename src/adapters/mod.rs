// Adapters layer: concrete clock sources and the terminal presentation/notifier.

pub mod clock;
pub mod terminal;
