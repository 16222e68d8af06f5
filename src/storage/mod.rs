pub mod cookie_store;
