//! Process-local adapters.

mod in_memory_pay_cycle_store;

pub use in_memory_pay_cycle_store::InMemoryPayCycleStore;
