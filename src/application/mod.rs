pub mod admin_auth;
pub mod checkout;
pub mod kitchen;
pub mod order_service;
pub mod session;
pub mod tracking;

#[cfg(test)]
pub(crate) mod testing;
