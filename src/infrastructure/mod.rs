pub mod models;
pub mod order_store;
pub mod paystack;
pub mod user_directory;

#[cfg(test)]
pub mod test_support;
