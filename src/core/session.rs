use redis::ConnectionLike;
use serde::{Deserialize, Serialize};

use crate::{model::user::User, settings::Config};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: String,
    pub role: String,
    pub refresh_token: String,
}

/// Stores the session under the access token; it lives as long as the token.
pub fn add_session<C: ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
    token: String,
    refresh_token: String,
) -> anyhow::Result<()> {
    let session_data = SessionData {
        user_id: user.id.to_string(),
        role: user.role.clone(),
        refresh_token,
    };
    let session_json = serde_json::to_string(&session_data)?;
    let ttl = config.jwt_exp as u64 * 60;
    redis::Cmd::set_ex(token, session_json, ttl).exec(redis_conn)?;
    Ok(())
}

pub fn get_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: String,
) -> anyhow::Result<Option<SessionData>> {
    let res: Option<String> = redis::cmd("get").arg(token).query(redis_conn)?;
    match res {
        Some(val) => Ok(Some(serde_json::from_str(val.as_str())?)),
        None => Ok(None),
    }
}

pub fn remove_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: String,
) -> anyhow::Result<bool> {
    let session = get_session(redis_conn, token.clone())?;
    if session.is_none() {
        return Ok(false);
    }
    redis::cmd("del").arg(token).exec(redis_conn)?;
    Ok(true)
}
