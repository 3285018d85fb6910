use serde::{Deserialize, Serialize};

use hexfront_protocol::{
    AttackRange, ClassTable, Hex, Team, UnitClass, UnitId, UnitSnapshot, UnitType,
};

use crate::rules::CompiledRules;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitType,
    pub class: UnitClass,
    pub team: Team,
    pub position: Hex,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub attack_vs: ClassTable<Option<i32>>,
    pub defense_vs: ClassTable<Option<i32>>,
    pub movement: i32,
    pub attack_range: AttackRange,
    pub fuel: i32,
    pub max_fuel: i32,
    pub xp: i32,
    pub moved: bool,
    pub attacked: bool,
    pub can_counter_attack: bool,
}

impl Unit {
    /// Fresh unit at full hp and fuel with stats copied from the rules table.
    pub fn from_rules(
        id: UnitId,
        kind: UnitType,
        team: Team,
        position: Hex,
        rules: &CompiledRules,
    ) -> Self {
        let stats = rules.unit(kind);
        Self {
            id,
            kind,
            class: stats.class,
            team,
            position,
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            attack: stats.attack,
            defense: stats.defense,
            attack_vs: stats.attack_vs,
            defense_vs: stats.defense_vs,
            movement: stats.movement,
            attack_range: stats.attack_range,
            fuel: stats.max_fuel,
            max_fuel: stats.max_fuel,
            xp: 0,
            moved: false,
            attacked: false,
            can_counter_attack: stats.can_counter_attack,
        }
    }

    #[inline]
    pub fn attack_against(&self, class: UnitClass) -> i32 {
        self.attack_vs.get(class).unwrap_or(self.attack)
    }

    #[inline]
    pub fn defense_against(&self, class: UnitClass) -> i32 {
        self.defense_vs.get(class).unwrap_or(self.defense)
    }

    /// Movement points usable this turn: the smaller of movement and fuel.
    #[inline]
    pub fn move_budget(&self) -> i32 {
        self.movement.min(self.fuel).max(0)
    }

    /// Applies damage, clamped at zero. Returns true when the unit is destroyed.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        self.hp = (self.hp - damage.max(0)).max(0);
        self.hp == 0
    }

    pub fn gain_xp(&mut self, amount: i32, cap: i32) {
        self.xp = (self.xp + amount.max(0)).min(cap);
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
    }

    pub fn refuel(&mut self) {
        self.fuel = self.max_fuel;
    }

    /// Marks the unit as done for the turn.
    pub fn exhaust(&mut self) {
        self.moved = true;
        self.attacked = true;
    }

    pub fn ready(&mut self) {
        self.moved = false;
        self.attacked = false;
    }

    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            kind: self.kind,
            team: self.team,
            position: self.position,
            hp: self.hp,
            max_hp: self.max_hp,
            fuel: self.fuel,
            xp: self.xp,
        }
    }
}
