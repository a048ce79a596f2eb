pub mod change_listener;
