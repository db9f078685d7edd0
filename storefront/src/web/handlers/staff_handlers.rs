// storefront/src/web/handlers/staff_handlers.rs

//! Role and page access management. Admins only.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{PageAccess, Role, UserProfile};
use crate::pipelines::common_steps::require_id;
use crate::state::AppState;
use crate::store::paths;
use crate::web::SessionUser;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
  pub user_id: String,
  #[serde(flatten)]
  pub profile: UserProfile,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffPayload {
  pub role: String,
  #[serde(default)]
  pub page_access: PageAccess,
}

#[instrument(name = "handler::list_staff", skip(app_state, user), fields(user_id = %user.user_id))]
pub async fn list_staff_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  user.session.require_admin()?;
  let staff: Vec<StaffMember> = app_state
    .store
    .list_as::<UserProfile>(paths::USERS)
    .await?
    .into_iter()
    .filter(|(_, profile)| profile.role != Role::Customer)
    .map(|(user_id, profile)| StaffMember { user_id, profile })
    .collect();
  Ok(HttpResponse::Ok().json(json!({ "staff": staff })))
}

/// Writes role and page access, keeping the rest of the profile. The user's
/// cached session is dropped so the change applies on their next request.
#[instrument(
  name = "handler::update_staff",
  skip(app_state, path, req_payload, user),
  fields(user_id = %user.user_id, target = %path.as_ref())
)]
pub async fn update_staff_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  req_payload: web::Json<UpdateStaffPayload>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  user.session.require_admin()?;
  let target = path.into_inner();
  require_id(&target, "user")?;
  let payload = req_payload.into_inner();
  let role: Role = payload.role.parse()?;

  let path = paths::user(&target);
  let mut profile = app_state
    .store
    .get_as::<UserProfile>(&path)
    .await?
    .unwrap_or_default();
  profile.role = role;
  profile.page_access = match role {
    Role::Staff => payload.page_access,
    _ => PageAccess::default(),
  };
  app_state.store.put_as(&path, &profile).await?;
  app_state.sessions.invalidate(&target);
  info!("User {} is now {} with access {:?}.", target, role.as_str(), profile.page_access.pages());

  Ok(HttpResponse::Ok().json(json!({
    "staff": StaffMember { user_id: target, profile },
  })))
}
