use crate::domain::{
    ProfileId, UserId,
    event::EventFormat,
    player::{Player, Roster},
};

pub trait TeamBalancingService {
    fn balance(
        &self,
        roster: &Roster,
        format: EventFormat,
    ) -> Result<Vec<TeamAllocation>, BalanceError>;
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    #[error("not enough players for two teams: {available} available, {required} required")]
    InsufficientPlayers { available: usize, required: usize },
    #[error("not enough goalkeepers: {available} available, {required} required")]
    InsufficientGoalkeepers { available: usize, required: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocatedPlayer {
    pub user_id: UserId,
    pub profile_id: Option<ProfileId>,
    pub rating: i32,
    pub is_goalkeeper: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamAllocation {
    pub name: String,
    pub total_rating: i32,
    pub members: Vec<AllocatedPlayer>,
}

#[derive(Default)]
struct TeamSlot {
    rating: i32,
    members: Vec<AllocatedPlayer>,
}

impl TeamSlot {
    fn push(&mut self, player: &Player, is_goalkeeper: bool) {
        self.rating += player.rating;
        self.members.push(AllocatedPlayer {
            user_id: player.user_id,
            profile_id: player.profile_id,
            rating: player.rating,
            is_goalkeeper,
        });
    }
}

/// Rating-descending, least-loaded greedy fill with one goalkeeper per team.
///
/// The result only depends on the roster order and contents, so the same
/// attendance snapshot always produces the same partition.
pub struct GreedyTeamBalancingService;

impl GreedyTeamBalancingService {
    pub fn new() -> Self {
        Self
    }

    fn select_goalkeepers(sorted: &[&Player], num_teams: usize) -> Vec<usize> {
        let mut goalkeepers: Vec<usize> = sorted
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_explicit_goalkeeper())
            .map(|(i, _)| i)
            .take(num_teams)
            .collect();
        if goalkeepers.len() < num_teams {
            let missing = num_teams - goalkeepers.len();
            goalkeepers.extend(
                sorted
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.is_voluntary_goalkeeper())
                    .map(|(i, _)| i)
                    .take(missing),
            );
        }
        goalkeepers
    }
}

impl TeamBalancingService for GreedyTeamBalancingService {
    fn balance(
        &self,
        roster: &Roster,
        format: EventFormat,
    ) -> Result<Vec<TeamAllocation>, BalanceError> {
        let per_team = format.players_per_team_with_goalkeeper();
        let num_teams = roster.len() / per_team;
        if num_teams < 2 {
            return Err(BalanceError::InsufficientPlayers {
                available: roster.len(),
                required: per_team * 2,
            });
        }

        // sort_by is stable, ties keep roster order
        let mut sorted: Vec<&Player> = roster.players().iter().collect();
        sorted.sort_by(|a, b| b.rating.cmp(&a.rating));

        let goalkeepers = Self::select_goalkeepers(&sorted, num_teams);
        if goalkeepers.len() < num_teams {
            return Err(BalanceError::InsufficientGoalkeepers {
                available: goalkeepers.len(),
                required: num_teams,
            });
        }

        let mut slots: Vec<TeamSlot> = (0..num_teams).map(|_| TeamSlot::default()).collect();
        let mut allocated = vec![false; sorted.len()];

        for (i, &index) in goalkeepers.iter().enumerate() {
            slots[i % num_teams].push(sorted[index], true);
            allocated[index] = true;
        }

        for (index, player) in sorted.iter().enumerate() {
            if allocated[index] {
                continue;
            }
            // min_by_key keeps the first minimum, so ties go to the lowest index
            let Some(best) = slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.members.len() < per_team)
                .min_by_key(|(_, slot)| slot.rating)
                .map(|(i, _)| i)
            else {
                break;
            };
            slots[best].push(player, false);
            allocated[index] = true;
        }

        let unassigned = allocated.iter().filter(|a| !**a).count();
        if unassigned > 0 {
            log::debug!(
                "{} players left without a team ({} teams of {})",
                unassigned,
                num_teams,
                per_team
            );
        }

        Ok(slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| TeamAllocation {
                name: format!("Team {}", i + 1),
                total_rating: slot.rating,
                members: slot.members,
            })
            .collect())
    }
}
