// storefront/src/store/paths.rs

//! Document paths used by the storefront and small helpers over them.

use super::{StoreError, StoreResult};

pub const PRODUCTS: &str = "products";
pub const USERS: &str = "users";

const FORBIDDEN_CHARS: &[char] = &['.', '#', '$', '[', ']', '%'];

pub fn product(product_id: &str) -> String {
  format!("{}/{}", PRODUCTS, product_id)
}

pub fn cart(user_id: &str) -> String {
  format!("carts/{}", user_id)
}

pub fn cart_item(user_id: &str, product_id: &str) -> String {
  format!("carts/{}/{}", user_id, product_id)
}

pub fn wishlist(user_id: &str) -> String {
  format!("wishlists/{}", user_id)
}

pub fn wishlist_item(user_id: &str, product_id: &str) -> String {
  format!("wishlists/{}/{}", user_id, product_id)
}

pub fn orders(user_id: &str) -> String {
  format!("orders/{}", user_id)
}

pub fn order(user_id: &str, order_id: &str) -> String {
  format!("orders/{}/{}", user_id, order_id)
}

pub fn ratings(product_id: &str) -> String {
  format!("ratings/{}", product_id)
}

pub fn user(user_id: &str) -> String {
  format!("{}/{}", USERS, user_id)
}

/// Checks that `path` is one or more non-empty segments without reserved characters.
pub fn validate(path: &str) -> StoreResult<()> {
  let valid = !path.is_empty()
    && path
      .split('/')
      .all(|seg| !seg.is_empty() && !seg.contains(FORBIDDEN_CHARS) && !seg.chars().any(char::is_control));
  if valid {
    Ok(())
  } else {
    Err(StoreError::InvalidPath(path.to_string()))
  }
}

/// A single path segment, e.g. an id taken from a request.
pub fn validate_segment(segment: &str) -> StoreResult<()> {
  if segment.contains('/') {
    return Err(StoreError::InvalidPath(segment.to_string()));
  }
  validate(segment)
}

pub fn parent_of(path: &str) -> &str {
  path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

pub fn last_segment(path: &str) -> &str {
  path.rsplit_once('/').map(|(_, key)| key).unwrap_or(path)
}

/// True when `path` is `prefix`, lies below it, or is an ancestor of it.
pub fn is_within(path: &str, prefix: &str) -> bool {
  if prefix.is_empty() || path == prefix {
    return true;
  }
  let below = path.len() > prefix.len() && path.starts_with(prefix) && path.as_bytes()[prefix.len()] == b'/';
  let above = prefix.len() > path.len() && prefix.starts_with(path) && prefix.as_bytes()[path.len()] == b'/';
  below || above
}
