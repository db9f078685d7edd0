// storefront/src/services/permissions.rs

//! Menu entries and page checks per role.

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{PageAccess, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
  pub key: &'static str,
  pub label: &'static str,
  pub route: &'static str,
  /// Page name matched against a staff member's page access.
  #[serde(skip)]
  pub page: &'static str,
  #[serde(skip)]
  pub admin_only: bool,
}

const fn entry(key: &'static str, label: &'static str, route: &'static str, page: &'static str) -> MenuEntry {
  MenuEntry {
    key,
    label,
    route,
    page,
    admin_only: false,
  }
}

pub const POS_PAGE: &str = "pos";

pub const MENU: &[MenuEntry] = &[
  entry("DASHBOARD", "Dashboard", "/admin/dashboard", "dashboard"),
  entry("INVENTORY", "Inventory", "/admin/inventory", "inventory"),
  entry("POS", "Point of Sale", "/admin/pos", POS_PAGE),
  entry("ORDERS", "Orders", "/admin/orders", "orders"),
  MenuEntry {
    admin_only: true,
    ..entry("STAFF", "Staff", "/admin/staff", "staff")
  },
  entry("HOME", "Home", "/", "home"),
  entry("SHOP", "Shop", "/shop", "shop"),
  entry("CART", "Cart", "/cart", "cart"),
  entry("WISHLIST", "Wishlist", "/wishlist", "wishlist"),
  entry("MY_ORDERS", "My Orders", "/orders", "my_orders"),
];

impl MenuEntry {
  pub fn is_admin_route(&self) -> bool {
    self.route.starts_with("/admin")
  }
}

/// Admins see every `/admin` entry. Staff always get the point of sale plus the
/// non-admin-only admin pages named in their access list. Customers see the
/// shop side.
pub fn visible_menu(role: Role, access: &PageAccess) -> Vec<&'static MenuEntry> {
  MENU
    .iter()
    .filter(|e| match role {
      Role::Admin => e.is_admin_route(),
      Role::Staff => e.is_admin_route() && !e.admin_only && (e.page == POS_PAGE || access.allows(e.page)),
      Role::Customer => !e.is_admin_route(),
    })
    .collect()
}

pub fn can_access_page(role: Role, access: &PageAccess, page: &str) -> bool {
  visible_menu(role, access).iter().any(|e| e.page == page)
}

pub fn require_page(role: Role, access: &PageAccess, page: &str) -> Result<(), AppError> {
  if can_access_page(role, access, page) {
    Ok(())
  } else {
    Err(AppError::Forbidden(format!("No access to the {} page.", page)))
  }
}

pub fn require_admin(role: Role) -> Result<(), AppError> {
  match role {
    Role::Admin => Ok(()),
    _ => Err(AppError::Forbidden("Administrator role required.".to_string())),
  }
}
