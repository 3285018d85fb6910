use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use hexfront_protocol::{BattleReport, Command, Event, Hex, Scenario, Team, UnitId};

use crate::capture::{self, CaptureError, CaptureOutcome};
use crate::combat::{self, CombatError};
use crate::history::{self, GameStateSnapshot};
use crate::movement;
use crate::narrative::{narrate_or_fallback, BattleFacts, Narrator, TemplateNarrator};
use crate::rules::CompiledRules;
use crate::state::{GameState, ScenarioError};
use crate::turn;
use crate::unit::Unit;
use crate::victory;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    #[error("unit {unit} belongs to {team}, not the active team")]
    NotYourUnit { unit: UnitId, team: Team },
    #[error("unit {0} has already moved this turn")]
    AlreadyMoved(UnitId),
    #[error("unit {0} has already attacked this turn")]
    AlreadyAttacked(UnitId),
    #[error("{to} is not reachable for unit {unit}")]
    Unreachable { unit: UnitId, to: Hex },
    #[error("no path for unit {unit} to {to}")]
    NoPath { unit: UnitId, to: Hex },
    #[error("unit {target} is not attackable by {attacker}")]
    NotAttackable { attacker: UnitId, target: UnitId },
    #[error("cannot capture: {0}")]
    CannotCapture(#[from] CaptureError),
    #[error("no tile at {0}")]
    MissingTile(Hex),
    #[error("the game is over")]
    GameOver,
    #[error("nothing to undo")]
    NothingToUndo,
}

impl From<CombatError> for GameError {
    fn from(err: CombatError) -> Self {
        match err {
            CombatError::UnknownUnit(unit) => GameError::UnknownUnit(unit),
            CombatError::MissingTile(hex) => GameError::MissingTile(hex),
        }
    }
}

/// Owns the game state and applies player commands to it.
pub struct GameEngine {
    state: GameState,
    rules: CompiledRules,
    rng: ChaCha8Rng,
    narrator: Box<dyn Narrator>,
    command_log: Vec<Command>,
}

impl GameEngine {
    pub fn new(state: GameState, rules: CompiledRules) -> Self {
        Self::with_seed(state, rules, 0)
    }

    pub fn with_seed(state: GameState, rules: CompiledRules, seed: u64) -> Self {
        Self {
            state,
            rules,
            rng: ChaCha8Rng::seed_from_u64(seed),
            narrator: Box::new(TemplateNarrator),
            command_log: Vec::new(),
        }
    }

    pub fn from_scenario(
        scenario: &Scenario,
        rules: CompiledRules,
        seed: u64,
    ) -> Result<Self, ScenarioError> {
        let state = GameState::from_scenario(scenario, &rules)?;
        Ok(Self::with_seed(state, rules, seed))
    }

    pub fn with_narrator(mut self, narrator: impl Narrator + 'static) -> Self {
        self.narrator = Box::new(narrator);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    /// Commands that were accepted, in order.
    pub fn command_log(&self) -> &[Command] {
        &self.command_log
    }

    pub fn query_reachable(&self, unit: UnitId) -> Vec<Hex> {
        movement::reachable(&self.state, &self.rules, unit)
    }

    pub fn query_attackable(&self, unit: UnitId) -> Vec<Hex> {
        movement::attackable(&self.state, unit)
    }

    pub fn query_path(&self, unit: UnitId, to: Hex) -> Option<Vec<Hex>> {
        movement::find_path(&self.state, &self.rules, unit, to)
    }

    pub fn query_damage_preview(&self, attacker: UnitId, target: UnitId) -> Option<i32> {
        combat::preview_damage(&self.state, &self.rules, attacker, target).ok()
    }

    pub fn can_undo(&self) -> bool {
        !self.state.is_over() && !self.state.history.is_empty()
    }

    /// UI-facing entry point: illegal commands are dropped and yield no events.
    pub fn apply_command(&mut self, command: Command) -> Vec<Event> {
        match self.try_apply_command(command) {
            Ok(events) => events,
            Err(err) => {
                tracing::debug!(error = %err, "command rejected");
                Vec::new()
            }
        }
    }

    /// Validates and applies one command. On error the state is unchanged.
    ///
    /// Committing commands push the pre-action snapshot onto the undo history once they succeed.
    pub fn try_apply_command(&mut self, command: Command) -> Result<Vec<Event>, GameError> {
        let checkpoint = command
            .is_committing()
            .then(|| GameStateSnapshot::capture(&self.state));
        let events = match &command {
            Command::SelectUnit { unit } => self.select_unit(*unit)?,
            Command::Deselect => self.deselect(),
            Command::MoveUnit { unit, to } => self.move_unit(*unit, *to)?,
            Command::Attack { attacker, target } => self.attack(*attacker, *target)?,
            Command::Wait { unit } => self.wait(*unit)?,
            Command::Capture { unit } => self.capture_city(*unit)?,
            Command::EndTurn => self.end_turn()?,
            Command::Undo => self.undo()?,
        };
        if let Some(snapshot) = checkpoint {
            self.state.history.push(snapshot);
        }
        self.command_log.push(command);
        Ok(events)
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        if self.state.is_over() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    /// A live unit of the active team.
    fn own_unit(&self, unit_id: UnitId) -> Result<&Unit, GameError> {
        let unit = self
            .state
            .unit(unit_id)
            .ok_or(GameError::UnknownUnit(unit_id))?;
        if unit.team != self.state.active_team {
            return Err(GameError::NotYourUnit {
                unit: unit_id,
                team: unit.team,
            });
        }
        Ok(unit)
    }

    fn select_unit(&mut self, unit_id: UnitId) -> Result<Vec<Event>, GameError> {
        self.ensure_playing()?;
        let unit = self.own_unit(unit_id)?;
        if unit.moved {
            return Err(GameError::AlreadyMoved(unit_id));
        }
        if unit.attacked {
            return Err(GameError::AlreadyAttacked(unit_id));
        }
        self.state.selected_unit = Some(unit_id);
        Ok(vec![Event::UnitSelected { unit: unit_id }])
    }

    fn deselect(&mut self) -> Vec<Event> {
        match self.state.selected_unit.take() {
            Some(_) => vec![Event::SelectionCleared],
            None => Vec::new(),
        }
    }

    fn move_unit(&mut self, unit_id: UnitId, to: Hex) -> Result<Vec<Event>, GameError> {
        self.ensure_playing()?;
        let unit = self.own_unit(unit_id)?;
        if unit.moved {
            return Err(GameError::AlreadyMoved(unit_id));
        }
        let class = unit.class;

        let reachable = movement::reachable_costs(&self.state, &self.rules, unit_id);
        if !reachable.contains_key(&to) {
            return Err(GameError::Unreachable { unit: unit_id, to });
        }
        let path = movement::find_path(&self.state, &self.rules, unit_id, to)
            .ok_or(GameError::NoPath { unit: unit_id, to })?;
        let fuel_spent = movement::path_cost(&self.state.board, &self.rules, class, &path)
            .ok_or(GameError::NoPath { unit: unit_id, to })?;

        let unit = self
            .state
            .unit_mut(unit_id)
            .ok_or(GameError::UnknownUnit(unit_id))?;
        unit.position = to;
        unit.fuel = (unit.fuel - fuel_spent).max(0);
        unit.moved = true;
        let fuel_left = unit.fuel;
        self.state.selected_unit = Some(unit_id);

        tracing::debug!(unit = %unit_id, to = %to, fuel_spent, fuel_left, "unit moved");
        Ok(vec![Event::UnitMoved {
            unit: unit_id,
            path,
            fuel_spent,
            fuel_left,
        }])
    }

    fn attack(&mut self, attacker_id: UnitId, target_id: UnitId) -> Result<Vec<Event>, GameError> {
        self.ensure_playing()?;
        let attacker = self.own_unit(attacker_id)?;
        if attacker.attacked {
            return Err(GameError::AlreadyAttacked(attacker_id));
        }
        let target = self
            .state
            .unit(target_id)
            .ok_or(GameError::UnknownUnit(target_id))?;
        if !movement::attackable(&self.state, attacker_id).contains(&target.position) {
            return Err(GameError::NotAttackable {
                attacker: attacker_id,
                target: target_id,
            });
        }
        let attacker_before = attacker.snapshot();
        let defender_before = target.snapshot();
        let terrain = self
            .state
            .board
            .terrain(target.position)
            .ok_or(GameError::MissingTile(target.position))?;

        let outcome = combat::resolve_attack(&mut self.state, &self.rules, attacker_id, target_id)?;
        self.state.selected_unit = None;

        let facts = BattleFacts {
            attacker: &attacker_before,
            defender: &defender_before,
            terrain,
            damage: outcome.damage,
            counter_damage: outcome.counter_damage,
        };
        let report = narrate_or_fallback(self.narrator.as_ref(), &facts);

        let mut events = vec![Event::CombatResolved {
            report: BattleReport {
                attacker: attacker_before.clone(),
                defender: defender_before.clone(),
                terrain,
                damage: outcome.damage,
                counter_damage: outcome.counter_damage,
                attacker_destroyed: outcome.attacker_destroyed,
                defender_destroyed: outcome.defender_destroyed,
                report,
            },
        }];
        if outcome.defender_destroyed {
            events.push(Event::UnitDestroyed {
                unit: target_id,
                at: defender_before.position,
                killer: Some(attacker_id),
            });
        }
        if outcome.attacker_destroyed {
            events.push(Event::UnitDestroyed {
                unit: attacker_id,
                at: attacker_before.position,
                killer: Some(target_id),
            });
        }
        if let Some(ended) = victory::update_status(&mut self.state) {
            events.push(ended);
        }
        Ok(events)
    }

    fn wait(&mut self, unit_id: UnitId) -> Result<Vec<Event>, GameError> {
        self.ensure_playing()?;
        let unit = self.own_unit(unit_id)?;
        if unit.attacked {
            return Err(GameError::AlreadyAttacked(unit_id));
        }

        if let Some(unit) = self.state.unit_mut(unit_id) {
            unit.exhaust();
        }
        self.state.selected_unit = None;
        Ok(vec![Event::UnitWaited { unit: unit_id }])
    }

    fn capture_city(&mut self, unit_id: UnitId) -> Result<Vec<Event>, GameError> {
        self.ensure_playing()?;
        self.own_unit(unit_id)?;

        let outcome = capture::capture(&mut self.state, &self.rules, &mut self.rng, unit_id)?;
        self.state.selected_unit = None;

        let mut events = Vec::new();
        match outcome {
            CaptureOutcome::Damaged {
                at,
                damage,
                hp,
                turns_remaining,
            } => events.push(Event::CityDamaged {
                at,
                by: unit_id,
                damage,
                hp,
                turns_remaining,
            }),
            CaptureOutcome::Captured {
                at,
                damage,
                previous_owner,
            } => {
                let team = self.state.active_team;
                events.push(Event::CityDamaged {
                    at,
                    by: unit_id,
                    damage,
                    hp: 0,
                    turns_remaining: 0,
                });
                events.push(Event::CityCaptured {
                    at,
                    team,
                    previous_owner,
                });
            }
        }
        if let Some(ended) = victory::update_status(&mut self.state) {
            events.push(ended);
        }
        Ok(events)
    }

    fn end_turn(&mut self) -> Result<Vec<Event>, GameError> {
        self.ensure_playing()?;
        Ok(turn::end_turn(&mut self.state, &self.rules, &mut self.rng))
    }

    fn undo(&mut self) -> Result<Vec<Event>, GameError> {
        self.ensure_playing()?;
        if !history::undo(&mut self.state) {
            return Err(GameError::NothingToUndo);
        }
        tracing::debug!(remaining = self.state.history.len(), "undo applied");
        Ok(vec![Event::UndoApplied {
            turn: self.state.turn,
            team: self.state.active_team,
            remaining: self.state.history.len(),
        }])
    }
}
