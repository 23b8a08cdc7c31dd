mod common;

use common::{default_stats, hazard_move, make_mon, make_move, side, status_move};
use pokemon_battle_search::battle::{candidate_battles, expected_damage, Battle, BattleOracle, Battler};
use pokemon_battle_search::model::{Hazard, MoveCategory, Pokemon, Scenario, StatusCondition};
use pokemon_battle_search::{safest_action, Action, Oracle, OracleError, SearchConfig, Side};

fn duel(bot: Pokemon, opponent: Pokemon) -> Battle {
    Battle::from_sides(&side(vec![bot]), &side(vec![opponent]), 1)
}

fn strike(name: &str, priority: i32) -> pokemon_battle_search::model::Move {
    make_move(name, "normal", MoveCategory::Physical, 200, 100.0, priority)
}

fn use_move(id: &str) -> Action {
    Action::Move(id.to_string())
}

#[test]
fn priority_beats_speed() {
    let slow_with_priority = make_mon("Slowmon", &["normal"], default_stats(100, 50), vec![strike("Quick Blow", 1)]);
    let fast_no_priority = make_mon("Fastmon", &["normal"], default_stats(100, 100), vec![strike("Heavy Swing", 0)]);
    let battle = duel(slow_with_priority, fast_no_priority);

    let outcomes = BattleOracle
        .apply(&battle, &use_move("quickblow"), &use_move("heavyswing"))
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    let after = &outcomes[0].state;
    assert!(after.active(Side::Opponent).is_fainted());
    assert_eq!(after.active(Side::Bot).hp, 100.0);
    assert_eq!(BattleOracle.winner(after), Some(Side::Bot));
}

#[test]
fn speed_beats_lower_speed_when_priority_equal() {
    let fast = make_mon("Fast", &["normal"], default_stats(100, 120), vec![strike("Strike", 0)]);
    let slow = make_mon("Slow", &["normal"], default_stats(100, 60), vec![strike("Strike", 0)]);
    let battle = duel(slow, fast);

    let outcomes = BattleOracle
        .apply(&battle, &use_move("strike"), &use_move("strike"))
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(BattleOracle.winner(&outcomes[0].state), Some(Side::Opponent));
}

#[test]
fn speed_ties_split_into_both_orders() {
    let a = make_mon("MonoA", &["normal"], default_stats(100, 80), vec![strike("Strike", 0)]);
    let b = make_mon("MonoB", &["normal"], default_stats(100, 80), vec![strike("Strike", 0)]);
    let battle = duel(a, b);

    let outcomes = BattleOracle
        .apply(&battle, &use_move("strike"), &use_move("strike"))
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.probability == 0.5));
    let winners: Vec<Option<Side>> = outcomes.iter().map(|o| BattleOracle.winner(&o.state)).collect();
    assert!(winners.contains(&Some(Side::Bot)));
    assert!(winners.contains(&Some(Side::Opponent)));
}

#[test]
fn accuracy_splits_hit_and_miss() {
    let shaky = make_move("Shaky", "normal", MoveCategory::Physical, 50, 50.0, 0);
    let attacker = make_mon("Shooter", &["normal"], default_stats(100, 100), vec![shaky]);
    let target = make_mon("Target", &["water"], default_stats(100, 50), vec![status_move("Splash", None)]);
    let battle = duel(attacker, target);

    let outcomes = BattleOracle
        .apply(&battle, &use_move("shaky"), &use_move("splash"))
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    let total: f64 = outcomes.iter().map(|o| o.probability).sum();
    assert!((total - 1.0).abs() < 1e-12);
    let damaged = outcomes
        .iter()
        .filter(|o| o.state.active(Side::Opponent).hp < 100.0)
        .count();
    assert_eq!(damaged, 1);
}

#[test]
fn stab_and_type_effectiveness_affect_damage() {
    let fire_move = make_move("Flame", "fire", MoveCategory::Special, 90, 100.0, 0);
    let neutral_move = make_move("Neutral", "normal", MoveCategory::Special, 90, 100.0, 0);
    let attacker = Battler::from_pokemon(&make_mon("Blaze", &["fire"], default_stats(100, 80), vec![fire_move.clone()]));
    let grass = Battler::from_pokemon(&make_mon("Leafy", &["grass"], default_stats(100, 80), Vec::new()));
    let water = Battler::from_pokemon(&make_mon("Splash", &["water"], default_stats(100, 80), Vec::new()));

    let fire_into_grass = expected_damage(&attacker, &grass, &fire_move);
    let fire_into_water = expected_damage(&attacker, &water, &fire_move);
    let neutral_into_grass = expected_damage(&attacker, &grass, &neutral_move);

    assert!(fire_into_grass > fire_into_water);
    assert!(fire_into_grass > neutral_into_grass);
}

#[test]
fn immunities_zero_out_damage() {
    let quake = make_move("Earthquake", "ground", MoveCategory::Physical, 100, 100.0, 0);
    let bolt = make_move("Thunderbolt", "electric", MoveCategory::Special, 90, 100.0, 0);
    let attacker = Battler::from_pokemon(&make_mon("Hitter", &["ground"], default_stats(100, 80), Vec::new()));

    let mut floater = make_mon("Floater", &["psychic"], default_stats(100, 80), Vec::new());
    floater.ability = Some("Levitate".into());
    let floater = Battler::from_pokemon(&floater);
    let grounded = Battler::from_pokemon(&make_mon("Digger", &["ground"], default_stats(100, 80), Vec::new()));

    assert_eq!(expected_damage(&attacker, &floater, &quake), 0.0);
    assert_eq!(expected_damage(&attacker, &grounded, &bolt), 0.0);
    assert!(expected_damage(&attacker, &grounded, &quake) > 0.0);
}

#[test]
fn burn_halves_physical_damage() {
    let punch = make_move("Punch", "fighting", MoveCategory::Physical, 80, 100.0, 0);
    let mut healthy = Battler::from_pokemon(&make_mon("Brawler", &["fighting"], default_stats(100, 80), Vec::new()));
    let target = Battler::from_pokemon(&make_mon("Dummy", &["water"], default_stats(100, 80), Vec::new()));
    let full = expected_damage(&healthy, &target, &punch);
    healthy.status = Some(StatusCondition::Burn);
    let burned = expected_damage(&healthy, &target, &punch);
    assert!((burned - full / 2.0).abs() < 1e-9);
}

#[test]
fn fainted_active_must_switch_and_the_other_side_waits() {
    let mut down = make_mon("Down", &["normal"], default_stats(100, 80), vec![strike("Strike", 0)]);
    down.hp = Some(0);
    let reserve = make_mon("Reserve", &["water"], default_stats(100, 80), vec![strike("Strike", 0)]);
    let foe = make_mon("Foe", &["normal"], default_stats(100, 80), vec![strike("Strike", 0)]);
    let battle = Battle::from_sides(&side(vec![down, reserve]), &side(vec![foe]), 3);

    assert_eq!(
        BattleOracle.legal_actions(&battle, Side::Bot),
        vec![Action::Switch("reserve".into())]
    );
    assert_eq!(BattleOracle.legal_actions(&battle, Side::Opponent), vec![Action::Pass]);

    let outcomes = BattleOracle
        .apply(&battle, &Action::Switch("reserve".into()), &Action::Pass)
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].state.active(Side::Bot).id, "reserve");
    assert_eq!(outcomes[0].state.turn, 4);
}

#[test]
fn switching_into_stealth_rock_costs_hp() {
    let lead = make_mon("Lead", &["water"], default_stats(100, 80), vec![strike("Strike", 0)]);
    let bird = make_mon("Bird", &["fire"], default_stats(100, 80), vec![strike("Strike", 0)]);
    let foe = make_mon("Foe", &["normal"], default_stats(100, 50), vec![status_move("Splash", None)]);
    let mut bot_side = side(vec![lead, bird]);
    bot_side.hazards.push(Hazard::Stealthrock);
    let battle = Battle::from_sides(&bot_side, &side(vec![foe]), 1);

    let outcomes = BattleOracle
        .apply(&battle, &Action::Switch("bird".into()), &use_move("splash"))
        .unwrap();
    let after = &outcomes[0].state;
    assert_eq!(after.active(Side::Bot).id, "bird");
    assert!((after.active(Side::Bot).hp - 75.0).abs() < 1e-9);
}

#[test]
fn status_and_hazard_moves_change_the_field() {
    let setter = make_mon(
        "Setter",
        &["rock"],
        default_stats(100, 100),
        vec![hazard_move("Stealth Rock"), status_move("Toxic Spikes", Some(StatusCondition::Poison))],
    );
    let foe = make_mon("Foe", &["normal"], default_stats(100, 50), vec![status_move("Splash", None)]);
    let battle = duel(setter, foe);

    let rocks = BattleOracle
        .apply(&battle, &use_move("stealthrock"), &use_move("splash"))
        .unwrap();
    assert!(rocks[0].state.opponent.stealth_rock);
    assert!(!rocks[0].state.bot.stealth_rock);

    let poisoned = BattleOracle
        .apply(&battle, &use_move("toxicspikes"), &use_move("splash"))
        .unwrap();
    let foe_after = poisoned[0].state.active(Side::Opponent);
    assert_eq!(foe_after.status, Some(StatusCondition::Poison));
    // Poison ticks at the end of the turn it lands.
    assert!((foe_after.hp - 87.5).abs() < 1e-9);
}

#[test]
fn illegal_actions_are_oracle_errors() {
    let a = make_mon("MonoA", &["normal"], default_stats(100, 80), vec![strike("Strike", 0)]);
    let b = make_mon("MonoB", &["normal"], default_stats(100, 80), vec![strike("Strike", 0)]);
    let battle = duel(a, b);

    assert_eq!(
        BattleOracle.apply(&battle, &use_move("hyperbeam"), &use_move("strike")).unwrap_err(),
        OracleError::UnknownMove("hyperbeam".into())
    );
    assert_eq!(
        BattleOracle
            .apply(&battle, &Action::Switch("ghost".into()), &use_move("strike"))
            .unwrap_err(),
        OracleError::IllegalSwitch("ghost".into())
    );
    assert_eq!(
        BattleOracle.apply(&battle, &use_move("strike"), &Action::Pass).unwrap_err(),
        OracleError::IllegalAction {
            side: Side::Opponent,
            action: Action::Pass
        }
    );
}

#[test]
fn score_is_zero_sum() {
    let a = make_mon("MonoA", &["normal"], default_stats(100, 90), vec![make_move("Tap", "normal", MoveCategory::Physical, 40, 100.0, 0)]);
    let b = make_mon("MonoB", &["normal"], default_stats(100, 80), vec![status_move("Splash", None)]);
    let battle = duel(a, b);
    let outcomes = BattleOracle.apply(&battle, &use_move("tap"), &use_move("splash")).unwrap();
    let after = &outcomes[0].state;

    let bot_view = BattleOracle.score(after, Side::Bot);
    assert!(bot_view > 0.0);
    assert_eq!(bot_view, -BattleOracle.score(after, Side::Opponent));
}

#[test]
fn search_prefers_the_super_effective_move() {
    let attacker = make_mon(
        "Sprout",
        &["grass"],
        default_stats(100, 80),
        vec![
            make_move("Tackle", "normal", MoveCategory::Physical, 40, 100.0, 0),
            make_move("Giga Drain", "grass", MoveCategory::Special, 75, 100.0, 0),
        ],
    );
    let bite = make_move("Bite", "normal", MoveCategory::Physical, 60, 100.0, 0);
    let foe = make_mon("Fishy", &["water"], default_stats(200, 70), vec![bite]);
    let battle = duel(attacker, foe);

    for depth in 0..2 {
        let config = SearchConfig::default().with_depth(depth).with_parallel(false);
        let decision = safest_action(&BattleOracle, std::slice::from_ref(&battle), &config).unwrap();
        assert_eq!(decision.action(), &use_move("gigadrain"), "depth {depth}");
    }
}

#[test]
fn scenario_expands_into_one_battle_per_opponent_state() {
    let raw = r#"{
        "bot": {"team": [{"name": "Kartana", "types": ["grass", "steel"],
            "stats": {"hp": 135, "atk": 233, "def": 183, "spa": 61, "spd": 51, "spe": 161},
            "moves": [{"name": "Leaf Blade", "type": "grass", "category": "physical", "power": 90}]}]},
        "opponentBranches": [
            {"team": [{"name": "Rotom-Wash", "types": ["electric", "water"], "ability": "Levitate",
                "stats": {"hp": 125, "atk": 85, "def": 127, "spa": 125, "spd": 127, "spe": 106},
                "moves": [{"name": "Volt Switch", "type": "electric", "category": "special", "power": 70}]}]},
            {"team": [{"name": "Rotom-Wash", "types": ["electric", "water"], "ability": "Levitate", "hp": 60,
                "stats": {"hp": 125, "atk": 85, "def": 127, "spa": 125, "spd": 127, "spe": 106},
                "moves": [{"name": "Will-O-Wisp", "type": "fire", "category": "status", "status": "burn", "accuracy": 85}]}],
             "hazards": ["stealthrock"]}
        ],
        "turn": 5
    }"#;
    let scenario: Scenario = serde_json::from_str(raw).unwrap();
    let battles = candidate_battles(&scenario);

    assert_eq!(battles.len(), 2);
    assert!(battles.iter().all(|b| b.turn == 5));
    assert_eq!(battles[0].active(Side::Opponent).hp, 125.0);
    assert_eq!(battles[1].active(Side::Opponent).hp, 60.0);
    assert!(battles[1].opponent.stealth_rock);
    assert_eq!(
        BattleOracle.legal_actions(&battles[1], Side::Opponent),
        vec![use_move("willowisp")]
    );
}
