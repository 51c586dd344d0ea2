pub mod callback_gate;
pub mod native_handle;
pub mod token_registry;
