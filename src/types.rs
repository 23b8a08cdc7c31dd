use phf::phf_map;

/// Abilities that make their holder immune to one attacking type.
static ABILITY_IMMUNITIES: phf::Map<&'static str, &'static str> = phf_map! {
    "levitate" => "ground",
    "voltabsorb" => "electric",
    "lightningrod" => "electric",
    "motordrive" => "electric",
    "waterabsorb" => "water",
    "stormdrain" => "water",
    "dryskin" => "water",
    "flashfire" => "fire",
    "sapsipper" => "grass",
};

pub fn ability_immunity(ability: &str) -> Option<&'static str> {
    ABILITY_IMMUNITIES.get(ability).copied()
}

/// Damage multiplier of `move_type` against a target, including an ability
/// immunity when the target has one.
pub fn effectiveness_against(move_type: &str, target_types: &[String], ability: Option<&str>) -> f64 {
    let immune = ability
        .and_then(ability_immunity)
        .is_some_and(|t| t.eq_ignore_ascii_case(move_type));
    if immune {
        return 0.0;
    }
    type_effectiveness(move_type, target_types)
}

pub fn type_effectiveness(move_type: &str, target_types: &[String]) -> f64 {
    let mut multiplier = 1.0;
    for t in target_types {
        multiplier *= single_type_effectiveness(move_type, t);
    }
    multiplier
}

struct Matchup {
    double: &'static [&'static str],
    half: &'static [&'static str],
    immune: &'static [&'static str],
}

// Gen 9 chart, attacking type -> matchup. Unlisted pairs are neutral.
static CHART: phf::Map<&'static str, Matchup> = phf_map! {
    "normal" => Matchup {
        double: &[],
        half: &["rock", "steel"],
        immune: &["ghost"],
    },
    "fire" => Matchup {
        double: &["grass", "ice", "bug", "steel"],
        half: &["fire", "water", "rock", "dragon"],
        immune: &[],
    },
    "water" => Matchup {
        double: &["fire", "ground", "rock"],
        half: &["water", "grass", "dragon"],
        immune: &[],
    },
    "electric" => Matchup {
        double: &["water", "flying"],
        half: &["electric", "grass", "dragon"],
        immune: &["ground"],
    },
    "grass" => Matchup {
        double: &["water", "ground", "rock"],
        half: &["fire", "grass", "poison", "flying", "bug", "dragon", "steel"],
        immune: &[],
    },
    "ice" => Matchup {
        double: &["grass", "ground", "flying", "dragon"],
        half: &["fire", "water", "ice", "steel"],
        immune: &[],
    },
    "fighting" => Matchup {
        double: &["normal", "ice", "rock", "dark", "steel"],
        half: &["poison", "flying", "psychic", "bug", "fairy"],
        immune: &["ghost"],
    },
    "poison" => Matchup {
        double: &["grass", "fairy"],
        half: &["poison", "ground", "rock", "ghost"],
        immune: &["steel"],
    },
    "ground" => Matchup {
        double: &["fire", "electric", "poison", "rock", "steel"],
        half: &["grass", "bug"],
        immune: &["flying"],
    },
    "flying" => Matchup {
        double: &["grass", "fighting", "bug"],
        half: &["electric", "rock", "steel"],
        immune: &[],
    },
    "psychic" => Matchup {
        double: &["fighting", "poison"],
        half: &["psychic", "steel"],
        immune: &["dark"],
    },
    "bug" => Matchup {
        double: &["grass", "psychic", "dark"],
        half: &["fire", "fighting", "poison", "flying", "ghost", "steel", "fairy"],
        immune: &[],
    },
    "rock" => Matchup {
        double: &["fire", "ice", "flying", "bug"],
        half: &["fighting", "ground", "steel"],
        immune: &[],
    },
    "ghost" => Matchup {
        double: &["ghost", "psychic"],
        half: &["dark"],
        immune: &["normal"],
    },
    "dragon" => Matchup {
        double: &["dragon"],
        half: &["steel"],
        immune: &["fairy"],
    },
    "dark" => Matchup {
        double: &["psychic", "ghost"],
        half: &["fighting", "dark", "fairy"],
        immune: &[],
    },
    "steel" => Matchup {
        double: &["rock", "ice", "fairy"],
        half: &["fire", "water", "electric", "steel"],
        immune: &[],
    },
    "fairy" => Matchup {
        double: &["fighting", "dragon", "dark"],
        half: &["fire", "poison", "steel"],
        immune: &[],
    },
};

fn single_type_effectiveness(attacking: &str, defending: &str) -> f64 {
    let Some(matchup) = CHART.get(attacking.to_ascii_lowercase().as_str()) else {
        return 1.0;
    };
    let def = defending.to_ascii_lowercase();
    if matchup.immune.contains(&def.as_str()) {
        0.0
    } else if matchup.double.contains(&def.as_str()) {
        2.0
    } else if matchup.half.contains(&def.as_str()) {
        0.5
    } else {
        1.0
    }
}
