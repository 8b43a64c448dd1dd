use std::{cmp::Ordering, sync::Arc};

use arrayvec::ArrayVec;
use rand::Rng;

use crate::{
    SpecError, TurnError,
    core::{
        Ability, ElementType, MoveCategory, MoveData, MoveEffect, STRUGGLE, StatKey, Status,
        StatusKind,
    },
};

use super::combatant::{Combatant, CombatantSpec, LEVEL, MAX_MOVES};

/// One of the two battling sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Side {
    #[display("side A")]
    A,
    #[display("side B")]
    B,
}

impl Side {
    pub const BOTH: [Self; 2] = [Self::A, Self::B];

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// The action a side submits for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveChoice {
    /// Use the move in the given moveset slot.
    Move(usize),
    /// Only legal once every move is out of PP.
    Struggle,
}

/// A single-combatant-per-side battle.
///
/// All state is owned by value, so `clone()` yields a battle that can be advanced
/// speculatively without affecting the original.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use pokevo_engine::{
///     Battle, CombatantSpec, MoveChoice, MoveId, Nature, SpeciesData, StatTable,
/// };
///
/// let spec = |name: &str, moves: &[&str]| {
///     let species = SpeciesData::from_name(name).unwrap();
///     Arc::new(CombatantSpec {
///         name: name.to_owned(),
///         base_stats: species.base_stats,
///         types: species.types.iter().copied().collect(),
///         ability: species.ability,
///         nature: Nature::Hardy,
///         evs: StatTable::splat(0),
///         moves: moves.iter().map(|m| MoveId::from_name(m).unwrap()).collect(),
///     })
/// };
///
/// let mut battle = Battle::start(
///     spec("garchomp", &["earthquake"]),
///     spec("heatran", &["earth-power"]),
/// )
/// .unwrap();
/// let mut rng = rand::rng();
/// while !battle.is_finished() {
///     battle
///         .submit_turn(MoveChoice::Move(0), MoveChoice::Move(0), &mut rng)
///         .unwrap();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Battle {
    combatants: [Combatant; 2],
    turn: u32,
    turn_limit: u32,
    finished: bool,
}

impl Battle {
    /// Turns after which an undecided battle ends in a draw.
    pub const DEFAULT_TURN_LIMIT: u32 = 200;

    /// Brings both combatants in and applies entry abilities.
    pub fn start(a: Arc<CombatantSpec>, b: Arc<CombatantSpec>) -> Result<Self, SpecError> {
        let mut battle = Self {
            combatants: [Combatant::new(a)?, Combatant::new(b)?],
            turn: 0,
            turn_limit: Self::DEFAULT_TURN_LIMIT,
            finished: false,
        };
        for side in Side::BOTH {
            let (user, target) = battle.pair_mut(side);
            if user.ability() == Ability::Intimidate {
                target.change_stage(StatKey::Atk, -1);
            }
        }
        Ok(battle)
    }

    #[must_use]
    pub fn with_turn_limit(mut self, turn_limit: u32) -> Self {
        self.turn_limit = turn_limit;
        self
    }

    #[must_use]
    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.index()]
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The winning side, or `None` while ongoing or on a draw.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        if !self.finished {
            return None;
        }
        match (
            self.combatant(Side::A).is_fainted(),
            self.combatant(Side::B).is_fainted(),
        ) {
            (false, true) => Some(Side::A),
            (true, false) => Some(Side::B),
            _ => None,
        }
    }

    /// Every choice `side` may legally submit this turn.
    #[must_use]
    pub fn legal_choices(&self, side: Side) -> ArrayVec<MoveChoice, MAX_MOVES> {
        let combatant = self.combatant(side);
        if combatant.has_available_move() {
            combatant
                .available_moves()
                .map(|(slot, _)| MoveChoice::Move(slot))
                .collect()
        } else {
            [MoveChoice::Struggle].into_iter().collect()
        }
    }

    /// Static data of the move behind a choice.
    ///
    /// Returns `None` for a slot that does not exist.
    #[must_use]
    pub fn move_data(&self, side: Side, choice: MoveChoice) -> Option<&'static MoveData> {
        match choice {
            MoveChoice::Move(slot) => self
                .combatant(side)
                .slots()
                .get(slot)
                .map(|slot| slot.id.data()),
            MoveChoice::Struggle => Some(&STRUGGLE),
        }
    }

    /// Resolves one turn with both sides' choices.
    pub fn submit_turn<R>(&mut self, a: MoveChoice, b: MoveChoice, rng: &mut R) -> Result<(), TurnError>
    where
        R: Rng + ?Sized,
    {
        if self.finished {
            return Err(TurnError::BattleFinished);
        }
        self.check_choice(Side::A, a)?;
        self.check_choice(Side::B, b)?;

        let choices = [a, b];
        let first = self.first_mover(a, b, rng);
        for side in [first, first.opponent()] {
            self.execute(side, choices[side.index()], rng);
            if self.any_fainted() {
                break;
            }
        }

        if !self.any_fainted() {
            for side in Side::BOTH {
                self.end_of_turn(side);
            }
        }
        for combatant in &mut self.combatants {
            combatant.protected = false;
        }

        self.turn += 1;
        if self.any_fainted() || self.turn >= self.turn_limit {
            self.finished = true;
        }
        Ok(())
    }

    fn check_choice(&self, side: Side, choice: MoveChoice) -> Result<(), TurnError> {
        let combatant = self.combatant(side);
        match choice {
            MoveChoice::Move(slot) => match combatant.slots().get(slot) {
                None => Err(TurnError::SlotOutOfRange { side, slot }),
                Some(s) if s.pp == 0 => Err(TurnError::NoPpLeft { side, slot }),
                Some(_) => Ok(()),
            },
            MoveChoice::Struggle if combatant.has_available_move() => {
                Err(TurnError::StruggleNotAllowed { side })
            }
            MoveChoice::Struggle => Ok(()),
        }
    }

    fn first_mover<R>(&self, a: MoveChoice, b: MoveChoice, rng: &mut R) -> Side
    where
        R: Rng + ?Sized,
    {
        let priority = |side, choice| self.move_data(side, choice).map_or(0, |m| m.priority);
        let speed = |side| self.combatant(side).effective_stat(StatKey::Spe);
        let order = priority(Side::A, a)
            .cmp(&priority(Side::B, b))
            .then_with(|| speed(Side::A).total_cmp(&speed(Side::B)));
        match order {
            Ordering::Greater => Side::A,
            Ordering::Less => Side::B,
            Ordering::Equal if rng.random_bool(0.5) => Side::A,
            Ordering::Equal => Side::B,
        }
    }

    fn any_fainted(&self) -> bool {
        self.combatants.iter().any(Combatant::is_fainted)
    }

    fn pair_mut(&mut self, side: Side) -> (&mut Combatant, &mut Combatant) {
        let [a, b] = &mut self.combatants;
        match side {
            Side::A => (a, b),
            Side::B => (b, a),
        }
    }

    fn execute<R>(&mut self, side: Side, choice: MoveChoice, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let Some(data) = self.move_data(side, choice) else {
            return;
        };
        let (user, target) = self.pair_mut(side);
        if user.is_fainted() || target.is_fainted() {
            return;
        }
        if let MoveChoice::Move(slot) = choice {
            user.spend_pp(slot);
        }
        if !can_act(user, rng) {
            user.protected_last_turn = false;
            return;
        }

        if data.effect == MoveEffect::Protect {
            // consecutive protects fail
            user.protected = !user.protected_last_turn;
            user.protected_last_turn = user.protected;
            return;
        }
        user.protected_last_turn = false;

        let self_targeting = matches!(data.effect, MoveEffect::Boost(_) | MoveEffect::Heal)
            || (data.category.is_status() && data.effect == MoveEffect::None);
        if !self_targeting && target.protected {
            return;
        }
        if let Some(accuracy) = data.accuracy
            && rng.random_range(0..100) >= accuracy
        {
            return;
        }

        match data.category {
            MoveCategory::Status => apply_status_move(user, target, data, rng),
            MoveCategory::Physical | MoveCategory::Special => {
                let is_struggle = choice == MoveChoice::Struggle;
                apply_damaging_move(user, target, data, is_struggle, rng);
            }
        }
    }

    fn end_of_turn(&mut self, side: Side) {
        let (combatant, opponent) = self.pair_mut(side);
        if combatant.is_fainted() {
            return;
        }
        let max_hp = combatant.max_hp();
        let residual = match combatant.status_mut() {
            Some(Status {
                kind: StatusKind::Burn,
                ..
            }) => max_hp / 16,
            Some(Status {
                kind: StatusKind::Poison,
                ..
            }) => max_hp / 8,
            Some(Status {
                kind: StatusKind::Toxic,
                counter,
            }) => {
                *counter = counter.saturating_add(1);
                max_hp / 16 * u16::from(*counter)
            }
            _ => 0,
        };
        if residual > 0 {
            combatant.take_damage(residual.max(1));
        }
        if combatant.seeded && !combatant.is_fainted() {
            let drained = combatant.take_damage((max_hp / 8).max(1));
            if !opponent.is_fainted() {
                opponent.heal(drained);
            }
        }
    }
}

fn can_act<R>(user: &mut Combatant, rng: &mut R) -> bool
where
    R: Rng + ?Sized,
{
    let Some(status) = user.status() else {
        return true;
    };
    match status.kind {
        StatusKind::Sleep if status.counter == 0 => {
            *user.status_mut() = None;
            true
        }
        StatusKind::Sleep => {
            if let Some(status) = user.status_mut() {
                status.counter -= 1;
            }
            false
        }
        StatusKind::Freeze => {
            let thawed = rng.random_bool(0.2);
            if thawed {
                *user.status_mut() = None;
            }
            thawed
        }
        StatusKind::Paralysis => !rng.random_bool(0.25),
        StatusKind::Burn | StatusKind::Poison | StatusKind::Toxic => true,
    }
}

fn new_status<R>(kind: StatusKind, rng: &mut R) -> Status
where
    R: Rng + ?Sized,
{
    let mut status = Status::new(kind);
    if kind == StatusKind::Sleep {
        status.counter = rng.random_range(1..=3);
    }
    status
}

fn apply_status_move<R>(user: &mut Combatant, target: &mut Combatant, data: &MoveData, rng: &mut R)
where
    R: Rng + ?Sized,
{
    match data.effect {
        MoveEffect::InflictStatus(kind) => {
            target.try_set_status(new_status(kind, rng));
        }
        MoveEffect::Boost(changes) => {
            for (key, delta) in changes {
                user.change_stage(*key, *delta);
            }
        }
        MoveEffect::Heal => {
            user.heal(user.max_hp() / 2);
        }
        MoveEffect::LeechSeed => {
            if !target.types().contains(&ElementType::Grass) {
                target.seeded = true;
            }
        }
        _ => {}
    }
}

fn apply_damaging_move<R>(
    user: &mut Combatant,
    target: &mut Combatant,
    data: &MoveData,
    is_struggle: bool,
    rng: &mut R,
) where
    R: Rng + ?Sized,
{
    let at_full_hp = target.hp() == target.max_hp();
    let mut damage = roll_damage(user, target, data, is_struggle, rng);
    if target.ability() == Ability::Sturdy && at_full_hp && damage >= target.hp() {
        damage = target.hp() - 1;
    }
    let dealt = target.take_damage(damage);
    if dealt == 0 {
        return;
    }

    match data.effect {
        MoveEffect::Secondary { status, chance } => {
            if rng.random_range(0..100) < chance {
                target.try_set_status(new_status(status, rng));
            }
        }
        MoveEffect::SelfDrop(changes) => {
            for (key, delta) in changes {
                user.change_stage(*key, *delta);
            }
        }
        MoveEffect::Recoil(divisor) => {
            let recoil = if is_struggle {
                user.max_hp() / 4
            } else {
                dealt / u16::from(divisor)
            };
            user.take_damage(recoil.max(1));
        }
        MoveEffect::Drain(divisor) => {
            user.heal((dealt / u16::from(divisor)).max(1));
        }
        _ => {}
    }
}

fn type_multiplier(target: &Combatant, data: &MoveData, is_struggle: bool) -> f32 {
    if is_struggle {
        return 1.0;
    }
    let immune_by_ability = match (target.ability(), data.ty) {
        (Ability::Levitate, ElementType::Ground) | (Ability::FlashFire, ElementType::Fire) => true,
        _ => false,
    };
    if immune_by_ability {
        return 0.0;
    }
    data.ty.against_all(target.types())
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn roll_damage<R>(
    user: &Combatant,
    target: &Combatant,
    data: &MoveData,
    is_struggle: bool,
    rng: &mut R,
) -> u16
where
    R: Rng + ?Sized,
{
    let effectiveness = type_multiplier(target, data, is_struggle);
    if effectiveness <= 0.0 {
        return 0;
    }
    if data.effect == MoveEffect::FixedDamage {
        return LEVEL;
    }

    let mut power = f32::from(data.power);
    if data.effect == MoveEffect::Facade && user.status().is_some() {
        power *= 2.0;
    }
    if user.ability() == Ability::Technician && data.power <= 60 {
        power *= 1.5;
    }

    let (attack_key, defense_key) = if data.category.is_physical() {
        (StatKey::Atk, StatKey::Def)
    } else {
        (StatKey::Spa, StatKey::Spd)
    };
    let critical = rng.random_ratio(1, 24);
    let (attack, defense) = if critical {
        (
            user.effective_stat(attack_key)
                .max(f32::from(user.raw_stat(attack_key))),
            target
                .effective_stat(defense_key)
                .min(f32::from(target.raw_stat(defense_key))),
        )
    } else {
        (
            user.effective_stat(attack_key),
            target.effective_stat(defense_key),
        )
    };

    let level_factor = 2.0 * f32::from(LEVEL) / 5.0 + 2.0;
    let mut damage = level_factor * power * attack / defense.max(1.0) / 50.0 + 2.0;
    if critical {
        damage *= 1.5;
    }
    damage *= rng.random_range(0.85..=1.0);
    if !is_struggle && user.types().contains(&data.ty) {
        damage *= if user.ability() == Ability::Adaptability {
            2.0
        } else {
            1.5
        };
    }
    damage *= effectiveness;
    if data.category.is_physical()
        && user.status_kind() == Some(StatusKind::Burn)
        && data.effect != MoveEffect::Facade
    {
        damage *= 0.5;
    }
    if target.ability() == Ability::ThickFat && matches!(data.ty, ElementType::Fire | ElementType::Ice)
    {
        damage *= 0.5;
    }
    (damage.floor() as u16).max(1)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::core::{MoveId, Nature, SpeciesData, StatTable};

    fn spec(species: &str, moves: &[&str]) -> Arc<CombatantSpec> {
        let data = SpeciesData::from_name(species).unwrap();
        Arc::new(CombatantSpec {
            name: species.to_owned(),
            base_stats: data.base_stats,
            types: data.types.iter().copied().collect(),
            ability: data.ability,
            nature: Nature::Hardy,
            evs: StatTable::splat(0),
            moves: moves.iter().map(|m| MoveId::from_name(m).unwrap()).collect(),
        })
    }

    #[test]
    fn test_battle_runs_to_completion() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut battle = Battle::start(
            spec("garchomp", &["earthquake", "dragon-claw"]),
            spec("heatran", &["earth-power", "lava-plume"]),
        )
        .unwrap();
        while !battle.is_finished() {
            battle
                .submit_turn(MoveChoice::Move(0), MoveChoice::Move(0), &mut rng)
                .unwrap();
        }
        assert!(battle.turn() < Battle::DEFAULT_TURN_LIMIT);
        assert_eq!(battle.winner(), Some(Side::A));
    }

    #[test]
    fn test_levitate_grants_ground_immunity() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut battle = Battle::start(
            spec("garchomp", &["earthquake"]),
            spec("gengar", &["protect"]),
        )
        .unwrap();
        for _ in 0..3 {
            battle
                .submit_turn(MoveChoice::Move(0), MoveChoice::Move(0), &mut rng)
                .unwrap();
        }
        let gengar = battle.combatant(Side::B);
        assert_eq!(gengar.hp(), gengar.max_hp());
    }

    #[test]
    fn test_intimidate_applies_on_entry() {
        let battle = Battle::start(
            spec("salamence", &["dragon-claw"]),
            spec("garchomp", &["dragon-claw"]),
        )
        .unwrap();
        assert_eq!(battle.combatant(Side::B).stages().atk, -1);
        assert_eq!(battle.combatant(Side::A).stages().atk, 0);
    }

    #[test]
    fn test_illegal_choices_are_rejected() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut battle = Battle::start(
            spec("scizor", &["bullet-punch"]),
            spec("blissey", &["seismic-toss"]),
        )
        .unwrap();
        assert!(matches!(
            battle.submit_turn(MoveChoice::Move(3), MoveChoice::Move(0), &mut rng),
            Err(TurnError::SlotOutOfRange { side: Side::A, slot: 3 })
        ));
        assert!(matches!(
            battle.submit_turn(MoveChoice::Move(0), MoveChoice::Struggle, &mut rng),
            Err(TurnError::StruggleNotAllowed { side: Side::B })
        ));
        assert_eq!(battle.turn(), 0);
    }

    #[test]
    fn test_struggle_once_out_of_pp() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut battle = Battle::start(
            spec("blissey", &["protect"]),
            spec("blissey", &["soft-boiled", "recover"]),
        )
        .unwrap()
        .with_turn_limit(50);
        for _ in 0..10 {
            battle
                .submit_turn(MoveChoice::Move(0), MoveChoice::Move(0), &mut rng)
                .unwrap();
        }
        assert_eq!(
            battle.legal_choices(Side::A).as_slice(),
            &[MoveChoice::Struggle]
        );
        assert!(matches!(
            battle.submit_turn(MoveChoice::Move(0), MoveChoice::Move(0), &mut rng),
            Err(TurnError::NoPpLeft { side: Side::A, slot: 0 })
        ));
        battle
            .submit_turn(MoveChoice::Struggle, MoveChoice::Move(1), &mut rng)
            .unwrap();
        assert!(battle.combatant(Side::A).hp() < battle.combatant(Side::A).max_hp());
    }

    #[test]
    fn test_turn_limit_ends_in_draw() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut battle = Battle::start(
            spec("blissey", &["soft-boiled"]),
            spec("blissey", &["soft-boiled"]),
        )
        .unwrap()
        .with_turn_limit(5);
        while !battle.is_finished() {
            battle
                .submit_turn(MoveChoice::Move(0), MoveChoice::Move(0), &mut rng)
                .unwrap();
        }
        assert_eq!(battle.turn(), 5);
        assert_eq!(battle.winner(), None);
        assert!(matches!(
            battle.submit_turn(MoveChoice::Move(0), MoveChoice::Move(0), &mut rng),
            Err(TurnError::BattleFinished)
        ));
    }

    #[test]
    fn test_cloned_battle_does_not_touch_original() {
        let mut rng = Pcg32::seed_from_u64(11);
        let battle = Battle::start(
            spec("lucario", &["close-combat"]),
            spec("tyranitar", &["stone-edge"]),
        )
        .unwrap();
        let mut speculative = battle.clone();
        speculative
            .submit_turn(MoveChoice::Move(0), MoveChoice::Move(0), &mut rng)
            .unwrap();
        assert_eq!(battle.turn(), 0);
        for side in Side::BOTH {
            let c = battle.combatant(side);
            assert_eq!(c.hp(), c.max_hp());
            assert_eq!(c.stage_sum(), 0);
        }
        assert_ne!(
            speculative.combatant(Side::B).hp(),
            speculative.combatant(Side::B).max_hp()
        );
    }
}
