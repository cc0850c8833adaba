use uuid::Uuid;

use super::{load_summaries, match_views, require_name};
use crate::error::ApiError;
use crate::state::AppState;
use ladder_core::team_display_name;
use ladder_types::{RenameTeamRequest, Team, TeamDetails, User};

pub const TEAM_RECENT_MATCHES: u64 = 10;

pub async fn team_details(state: &AppState, viewer: &User, id: Uuid) -> Result<TeamDetails, ApiError> {
    let mut team = state
        .teams
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Team"))?;
    let members = load_summaries(state, &team.members()).await?;
    team.name = team_display_name(&team.name, &members);

    let recent = state.matches.for_team(id, TEAM_RECENT_MATCHES).await?;
    Ok(TeamDetails {
        team,
        members,
        recent_matches: match_views(state, &recent, Some(viewer.id)).await?,
    })
}

/// Only the two partners may rename their team.
pub async fn rename_team(
    state: &AppState,
    user: &User,
    id: Uuid,
    request: RenameTeamRequest,
) -> Result<Team, ApiError> {
    let team = state
        .teams
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Team"))?;
    if !team.has_member(user.id) {
        return Err(ApiError::forbidden("Only team members can rename the team"));
    }
    let name = require_name(&request.name, "Team")?;
    state
        .teams
        .rename(id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found("Team"))
}
