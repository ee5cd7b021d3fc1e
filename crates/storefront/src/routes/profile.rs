//! Profile route handlers.
//!
//! Everything under `/api/users`: profile edits, the embedded address,
//! profile pictures, and account deletion. All handlers require a logged-in
//! user, and the path ID (where present) must match the session user.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use bakehouse_core::{Email, UserId};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Address, CurrentUser, User};
use crate::routes::auth::session_error;
use crate::services::avatar::AvatarStore;
use crate::state::AppState;

/// Profile update form; absent or blank fields keep their prior value.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Address form for creating an address; every field is required.
#[derive(Debug, Deserialize)]
pub struct AddAddressForm {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Address form for editing; blank or absent fields keep their prior value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAddressForm {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

/// Phone form.
#[derive(Debug, Deserialize)]
pub struct PhoneForm {
    pub phone: String,
}

/// Standard profile mutation response.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

/// Normalize a form field: blank means "not provided".
fn provided(field: Option<&String>) -> Option<&str> {
    field.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Reject requests whose path ID does not match the session user.
fn require_own_profile(user: &CurrentUser, id: i32) -> Result<UserId> {
    if user.id.as_i32() != id {
        return Err(AppError::Unauthorized(
            "You can only modify your own profile".to_owned(),
        ));
    }
    Ok(user.id)
}

/// Fetch the session user's full row, treating absence as not-found.
async fn load_user(repo: &UserRepository<'_>, id: UserId) -> Result<User> {
    repo.get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
}

/// Best-effort removal of a stored avatar file.
///
/// By the time this runs the database already reflects the change, so the
/// request is semantically complete; a file that cannot be unlinked is
/// logged for an operator rather than surfaced as a request failure.
async fn discard_avatar(store: &AvatarStore, path: &str) {
    if let Err(e) = store.remove(path).await {
        tracing::warn!(error = %e, path, "failed to remove stored avatar file");
    }
}

/// Get the logged-in user's profile.
///
/// GET /api/users/me
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ProfileResponse>> {
    let repo = UserRepository::new(state.pool());
    let user = load_user(&repo, user.id).await?;

    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile fetched".to_owned(),
        user,
    }))
}

/// Update name, email, and/or username.
///
/// PUT /api/users/update-profile/{id}
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(form): Json<UpdateProfileForm>,
) -> Result<Json<ProfileResponse>> {
    let id = require_own_profile(&user, id)?;

    let email = match provided(form.email.as_ref()) {
        Some(raw) => Some(Email::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))?),
        None => None,
    };

    let repo = UserRepository::new(state.pool());
    let user = repo
        .update_profile(
            id,
            provided(form.name.as_ref()),
            email.as_ref(),
            provided(form.username.as_ref()),
        )
        .await?;

    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile updated successfully".to_owned(),
        user,
    }))
}

/// Upload or replace the profile picture.
///
/// PUT /api/users/upload-profile-pic (multipart, field `profile_pic`)
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn upload_profile_pic(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>> {
    let repo = UserRepository::new(state.pool());
    let existing = load_user(&repo, user.id).await?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if matches!(field.name(), Some("profile_pic" | "profilePic")) {
            let filename = field.file_name().unwrap_or("upload").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::BadRequest("No file uploaded".to_owned()));
    };

    let stored = state.avatars().save(user.id, &filename, &bytes).await?;
    repo.set_avatar_path(user.id, Some(&stored)).await?;

    // The new picture is safely recorded before the old file goes away
    if let Some(old) = &existing.avatar_path {
        discard_avatar(state.avatars(), old).await;
    }

    let user = load_user(&repo, user.id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile picture updated".to_owned(),
        user,
    }))
}

/// Remove the profile picture.
///
/// DELETE /api/users/remove-profile-pic
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_profile_pic(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ProfileResponse>> {
    let repo = UserRepository::new(state.pool());
    let existing = load_user(&repo, user.id).await?;

    let Some(old) = existing.avatar_path else {
        return Err(AppError::BadRequest(
            "No profile picture to remove".to_owned(),
        ));
    };

    repo.set_avatar_path(user.id, None).await?;
    discard_avatar(state.avatars(), &old).await;

    let user = load_user(&repo, user.id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile picture removed".to_owned(),
        user,
    }))
}

/// Delete the account, its avatar file, and the session.
///
/// DELETE /api/users/delete-account
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn delete_account(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let repo = UserRepository::new(state.pool());
    let existing = load_user(&repo, user.id).await?;

    if !repo.delete(user.id).await? {
        return Err(AppError::NotFound("User not found".to_owned()));
    }

    if let Some(old) = &existing.avatar_path {
        discard_avatar(state.avatars(), old).await;
    }

    session.flush().await.map_err(session_error)?;

    tracing::info!(user_id = %user.id, "account deleted");

    Ok(Json(
        serde_json::json!({ "success": true, "message": "Account deleted successfully" }),
    ))
}

/// Add the embedded address; all four fields are required.
///
/// POST /api/users/add-address
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn add_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(form): Json<AddAddressForm>,
) -> Result<Json<ProfileResponse>> {
    let address = Address {
        street: form.street.trim().to_owned(),
        city: form.city.trim().to_owned(),
        state: form.state.trim().to_owned(),
        pincode: form.pincode.trim().to_owned(),
    };
    if address.street.is_empty()
        || address.city.is_empty()
        || address.state.is_empty()
        || address.pincode.is_empty()
    {
        return Err(AppError::BadRequest(
            "All address fields are required".to_owned(),
        ));
    }

    let repo = UserRepository::new(state.pool());
    repo.set_address(user.id, &address).await?;

    let user = load_user(&repo, user.id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        message: "Address added successfully".to_owned(),
        user,
    }))
}

/// Edit the embedded address; blank fields keep their prior value.
///
/// PUT /api/users/update-address
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(form): Json<UpdateAddressForm>,
) -> Result<Json<ProfileResponse>> {
    let repo = UserRepository::new(state.pool());
    let existing = load_user(&repo, user.id).await?;

    let merged = merge_address(existing.address.as_ref(), &form)
        .ok_or_else(|| AppError::BadRequest("All address fields are required".to_owned()))?;
    repo.set_address(user.id, &merged).await?;

    let user = load_user(&repo, user.id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        message: "Address updated successfully".to_owned(),
        user,
    }))
}

/// Set the phone number.
///
/// PATCH /api/users/add-phone
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn add_phone(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(form): Json<PhoneForm>,
) -> Result<Json<ProfileResponse>> {
    let phone = form.phone.trim();
    if phone.is_empty() {
        return Err(AppError::BadRequest("Phone number is required".to_owned()));
    }

    let repo = UserRepository::new(state.pool());
    repo.set_phone(user.id, phone).await?;

    let user = load_user(&repo, user.id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        message: "Phone number added successfully".to_owned(),
        user,
    }))
}

/// Merge an edit form over an existing address.
///
/// Fields present and non-blank in the form win; anything else falls back to
/// the current address. Returns `None` when the result would be partial,
/// which can only happen with no existing address and an incomplete form.
fn merge_address(existing: Option<&Address>, form: &UpdateAddressForm) -> Option<Address> {
    let pick = |new: Option<&String>, old: Option<&str>| -> Option<String> {
        provided(new)
            .map(str::to_owned)
            .or_else(|| old.map(str::to_owned))
    };

    Some(Address {
        street: pick(form.street.as_ref(), existing.map(|a| a.street.as_str()))?,
        city: pick(form.city.as_ref(), existing.map(|a| a.city.as_str()))?,
        state: pick(form.state.as_ref(), existing.map(|a| a.state.as_str()))?,
        pincode: pick(form.pincode.as_ref(), existing.map(|a| a.pincode.as_str()))?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn existing() -> Address {
        Address {
            street: "12 Baker Lane".to_owned(),
            city: "Pune".to_owned(),
            state: "Maharashtra".to_owned(),
            pincode: "411001".to_owned(),
        }
    }

    #[test]
    fn test_merge_keeps_unmentioned_fields() {
        let form = UpdateAddressForm {
            city: Some("Mumbai".to_owned()),
            ..UpdateAddressForm::default()
        };
        let merged = merge_address(Some(&existing()), &form).unwrap();
        assert_eq!(merged.city, "Mumbai");
        assert_eq!(merged.street, "12 Baker Lane");
        assert_eq!(merged.pincode, "411001");
    }

    #[test]
    fn test_merge_treats_blank_as_absent() {
        let form = UpdateAddressForm {
            street: Some("   ".to_owned()),
            ..UpdateAddressForm::default()
        };
        let merged = merge_address(Some(&existing()), &form).unwrap();
        assert_eq!(merged.street, "12 Baker Lane");
    }

    #[test]
    fn test_merge_without_existing_needs_all_fields() {
        let form = UpdateAddressForm {
            street: Some("12 Baker Lane".to_owned()),
            city: Some("Pune".to_owned()),
            ..UpdateAddressForm::default()
        };
        assert!(merge_address(None, &form).is_none());

        let full = UpdateAddressForm {
            street: Some("12 Baker Lane".to_owned()),
            city: Some("Pune".to_owned()),
            state: Some("Maharashtra".to_owned()),
            pincode: Some("411001".to_owned()),
        };
        assert!(merge_address(None, &full).is_some());
    }

    #[test]
    fn test_provided_treats_blank_as_absent() {
        assert_eq!(provided(Some(&"  Mira  ".to_owned())), Some("Mira"));
        assert_eq!(provided(Some(&"   ".to_owned())), None);
        assert_eq!(provided(Some(&String::new())), None);
        assert_eq!(provided(None), None);
    }

    #[test]
    fn test_update_form_only_name_leaves_other_fields_unset() {
        // Omitted and blank fields both become None, which the repository
        // update turns into "keep the prior value"
        let form: UpdateProfileForm =
            serde_json::from_str(r#"{"name": "Mira Crumb"}"#).unwrap();
        assert_eq!(provided(form.name.as_ref()), Some("Mira Crumb"));
        assert_eq!(provided(form.email.as_ref()), None);
        assert_eq!(provided(form.username.as_ref()), None);

        let form: UpdateProfileForm =
            serde_json::from_str(r#"{"name": "Mira Crumb", "email": ""}"#).unwrap();
        assert_eq!(provided(form.email.as_ref()), None);
    }

    #[tokio::test]
    async fn test_discard_avatar_swallows_filesystem_errors() {
        let dir = std::env::temp_dir().join("bakehouse-discard-test");
        let store = AvatarStore::new(&dir);

        // remove_file on a directory fails; the discard must not propagate it
        let stuck = dir.join("stuck");
        tokio::fs::create_dir_all(&stuck).await.unwrap();
        tokio::fs::write(stuck.join("f"), b"x").await.unwrap();
        discard_avatar(&store, stuck.to_str().unwrap()).await;

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn test_require_own_profile() {
        let user = CurrentUser {
            id: UserId::new(3),
            email: Email::parse("mira@bakehouse.test").unwrap(),
            is_admin: false,
        };
        assert!(require_own_profile(&user, 3).is_ok());
        assert!(require_own_profile(&user, 4).is_err());
    }
}
