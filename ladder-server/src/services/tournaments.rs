use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::{load_summaries, load_users, require_name, require_user};
use crate::error::ApiError;
use crate::mailer::EmailMessage;
use crate::services::groups::group_card;
use crate::state::AppState;
use ladder_core::{podium, summarize, team_display_name, tournament_standings};
use ladder_types::{
    BadgeId, CreateTournamentRequest, MatchType, ParticipantStatus, ParticipantView, Standing,
    Tournament, TournamentDetails, TournamentStatus, UpdateTournamentRequest, User,
};

async fn require_tournament(state: &AppState, id: Uuid) -> Result<Tournament, ApiError> {
    state
        .tournaments
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tournament"))
}

async fn organized_tournament(
    state: &AppState,
    user: &User,
    id: Uuid,
) -> Result<Tournament, ApiError> {
    let tournament = require_tournament(state, id).await?;
    if tournament.organizer_id != user.id && !user.is_admin {
        return Err(ApiError::forbidden("Only the organizer can do that"));
    }
    Ok(tournament)
}

/// Current table. Singles rows are named after players, doubles rows after
/// the stored team.
pub async fn standings(state: &AppState, tournament: &Tournament) -> Result<Vec<Standing>, ApiError> {
    let matches = state.matches.for_tournament(tournament.id).await?;
    let users = load_users(state, matches.iter().flat_map(|m| m.participants())).await?;

    let mut names: HashMap<Uuid, String> = users
        .values()
        .map(|u| (u.id, summarize(u).display_name))
        .collect();
    if tournament.match_type == MatchType::Doubles {
        let team_ids: Vec<Uuid> = matches
            .iter()
            .flat_map(|m| [m.team1_id, m.team2_id])
            .flatten()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        for team in state.teams.find_by_ids(&team_ids).await? {
            let members: Vec<_> = team
                .members()
                .iter()
                .filter_map(|id| users.get(id))
                .map(summarize)
                .collect();
            names.insert(team.id, team_display_name(&team.name, &members));
        }
    }

    Ok(tournament_standings(&matches, tournament.match_type, &names))
}

pub(crate) async fn winner_name(
    state: &AppState,
    tournament: &Tournament,
) -> Result<Option<String>, ApiError> {
    let table = standings(state, tournament).await?;
    Ok(table.into_iter().next().map(|row| row.name))
}

/// Tournaments the user organizes or was invited to, soonest first.
pub async fn list_tournaments(state: &AppState, user: &User) -> Result<Vec<Tournament>, ApiError> {
    let mut tournaments: Vec<Tournament> = state
        .tournaments
        .for_user(user.id)
        .await?
        .into_iter()
        .map(|(t, _)| t)
        .collect();
    let seen: HashSet<Uuid> = tournaments.iter().map(|t| t.id).collect();
    tournaments.extend(
        state
            .tournaments
            .owned_by(user.id)
            .await?
            .into_iter()
            .filter(|t| !seen.contains(&t.id)),
    );
    tournaments.sort_by_key(|t| t.date);
    Ok(tournaments)
}

pub async fn create_tournament(
    state: &AppState,
    user: &User,
    mut request: CreateTournamentRequest,
) -> Result<Tournament, ApiError> {
    request.name = require_name(&request.name, "Tournament")?;
    let tournament = state.tournaments.create(user.id, &request).await?;
    tracing::info!("Tournament {} created by {}", tournament.id, user.id);
    Ok(tournament)
}

pub async fn tournament_details(
    state: &AppState,
    user: &User,
    id: Uuid,
) -> Result<TournamentDetails, ApiError> {
    let tournament = require_tournament(state, id).await?;
    let participants = state.tournaments.participants(id).await?;
    let participant_ids: HashSet<Uuid> = participants.iter().map(|p| p.user_id).collect();

    let users = load_users(
        state,
        participants
            .iter()
            .map(|p| p.user_id)
            .chain([tournament.organizer_id]),
    )
    .await?;
    let participant_views = participants
        .iter()
        .filter_map(|p| {
            users.get(&p.user_id).map(|u| ParticipantView {
                user: summarize(u),
                status: p.status,
                team_name: p.team_name.clone(),
            })
        })
        .collect();

    let table = standings(state, &tournament).await?;
    let podium = podium(&table, tournament.status);

    // Friends and fellow group members who are not on the list yet.
    let groups = state.groups.groups_for_user(user.id).await?;
    let mut candidates: HashSet<Uuid> = state.friends.friends_of(user.id).await?.into_iter().collect();
    let mut user_groups = Vec::with_capacity(groups.len());
    for group in groups {
        candidates.extend(state.groups.member_ids(group.id).await?);
        user_groups.push(group_card(state, group).await?);
    }
    candidates.remove(&user.id);
    let candidate_ids: Vec<Uuid> = candidates
        .into_iter()
        .filter(|id| !participant_ids.contains(id))
        .collect();
    let mut invitable_users = load_summaries(state, &candidate_ids).await?;
    invitable_users.sort_by_key(|u| u.display_name.to_lowercase());

    Ok(TournamentDetails {
        organizer: users.get(&tournament.organizer_id).map(summarize),
        is_owner: tournament.organizer_id == user.id,
        tournament,
        participants: participant_views,
        standings: table,
        podium,
        invitable_users,
        user_groups,
    })
}

pub async fn update_tournament(
    state: &AppState,
    user: &User,
    id: Uuid,
    mut request: UpdateTournamentRequest,
) -> Result<Tournament, ApiError> {
    let tournament = organized_tournament(state, user, id).await?;
    if let Some(name) = request.name.as_deref() {
        request.name = Some(require_name(name, "Tournament")?);
    }
    if request.match_type.is_some_and(|t| t != tournament.match_type)
        && state.matches.count_for_tournament(id).await? > 0
    {
        return Err(ApiError::validation(
            "Match type cannot change once matches have been played",
        ));
    }
    state
        .tournaments
        .update(id, &request)
        .await?
        .ok_or_else(|| ApiError::not_found("Tournament"))
}

pub async fn invite_player(
    state: &AppState,
    user: &User,
    id: Uuid,
    invitee: Uuid,
) -> Result<(), ApiError> {
    let tournament = organized_tournament(state, user, id).await?;
    let invited = require_user(state, invitee).await?;
    let email = invited.email.filter(|_| invited.is_ghost);
    if !state.tournaments.invite(tournament.id, invited.id, email).await? {
        return Err(ApiError::conflict("Player is already invited"));
    }
    Ok(())
}

/// Invites every member of a group who is not already on the list and
/// returns how many were added.
pub async fn invite_group(
    state: &AppState,
    user: &User,
    id: Uuid,
    group_id: Uuid,
) -> Result<u32, ApiError> {
    let tournament = organized_tournament(state, user, id).await?;
    state
        .groups
        .find_by_id(group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group"))?;

    let member_ids = state.groups.member_ids(group_id).await?;
    let members = load_users(state, member_ids.iter().copied()).await?;
    let mut added = 0;
    for member_id in member_ids {
        let Some(member) = members.get(&member_id) else {
            continue;
        };
        let email = member.email.clone().filter(|_| member.is_ghost);
        if state.tournaments.invite(tournament.id, member_id, email).await? {
            added += 1;
        }
    }
    tracing::info!("Invited {} members of group {} to {}", added, group_id, tournament.id);
    Ok(added)
}

pub async fn accept_invite(state: &AppState, user: &User, id: Uuid) -> Result<(), ApiError> {
    require_tournament(state, id).await?;
    if !state.tournaments.accept(id, user.id).await? {
        return Err(ApiError::not_found("Invitation"));
    }
    Ok(())
}

pub async fn decline_invite(state: &AppState, user: &User, id: Uuid) -> Result<(), ApiError> {
    require_tournament(state, id).await?;
    if !state.tournaments.decline(id, user.id).await? {
        return Err(ApiError::not_found("Invitation"));
    }
    Ok(())
}

pub async fn set_team_name(
    state: &AppState,
    user: &User,
    id: Uuid,
    team_name: &str,
) -> Result<(), ApiError> {
    let tournament = require_tournament(state, id).await?;
    if tournament.match_type != MatchType::Doubles {
        return Err(ApiError::validation("Team names are only used in doubles"));
    }
    let team_name = require_name(team_name, "Team")?;
    if !state.tournaments.set_team_name(id, user.id, &team_name).await? {
        return Err(ApiError::not_found("Invitation"));
    }
    Ok(())
}

/// Closes the tournament and emails the results to everyone who played.
/// A singles winner is awarded the champion badge.
pub async fn complete_tournament(
    state: &AppState,
    user: &User,
    id: Uuid,
) -> Result<Vec<Standing>, ApiError> {
    let tournament = organized_tournament(state, user, id).await?;
    if tournament.status == TournamentStatus::Completed {
        return Err(ApiError::conflict("Tournament is already completed"));
    }

    // The champion badge is written before the tournament is marked completed.
    let table = standings(state, &tournament).await?;
    if tournament.match_type == MatchType::Singles {
        if let Some(champion) = table.first() {
            state.badges.award(champion.id, BadgeId::Champion).await?;
        }
    }
    state
        .tournaments
        .set_status(id, TournamentStatus::Completed)
        .await?;

    let winner = table
        .first()
        .map(|row| row.name.clone())
        .unwrap_or_else(|| "No one".to_string());
    let top = podium(&table, TournamentStatus::Completed);
    let mut summary = String::new();
    for (place, row) in top.iter().enumerate() {
        summary.push_str(&format!(
            "{}. {} ({}-{})\n",
            place + 1,
            row.name,
            row.wins,
            row.losses
        ));
    }

    let accepted: Vec<Uuid> = state
        .tournaments
        .participants(id)
        .await?
        .into_iter()
        .filter(|p| p.status == ParticipantStatus::Accepted)
        .map(|p| p.user_id)
        .collect();
    let recipients = load_users(state, accepted.iter().copied()).await?;
    for participant in accepted {
        let Some(email) = recipients.get(&participant).and_then(|u| u.email.clone()) else {
            continue;
        };
        let message = EmailMessage {
            to: email,
            subject: format!("Results: {}", tournament.name),
            body: format!(
                "{} is complete. Congratulations to {winner}!\n\n{summary}",
                tournament.name
            ),
        };
        if let Err(err) = state.mailer.send(&message).await {
            tracing::error!("Failed to email {}: {:#}", message.to, err);
        }
    }

    tracing::info!("Tournament {} completed", id);
    Ok(table)
}

pub async fn tournament_standings_for(
    state: &AppState,
    id: Uuid,
) -> Result<Vec<Standing>, ApiError> {
    let tournament = require_tournament(state, id).await?;
    standings(state, &tournament).await
}
