//! The four fixed modules: learning content plus their six stages each.

use crate::quiz::ModuleId;
use crate::stage::{StageKind, StageSpec, STAGE_COUNT};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ModuleDef {
    pub id: ModuleId,
    pub name: &'static str,
    pub icon: &'static str,
    pub how_it_works: &'static [&'static str],
    /// System diagram as a chain of node labels.
    pub flow: &'static [&'static str],
    /// Extra diagram edges off the main chain.
    pub branches: &'static [(&'static str, &'static str)],
    pub key_facts: &'static [&'static str],
    pub achievement: &'static str,
    #[serde(skip)]
    pub stages: [StageSpec; STAGE_COUNT],
}

impl ModuleDef {
    pub fn stage(&self, number: u32) -> Option<&StageSpec> {
        let idx = usize::try_from(number).ok()?.checked_sub(1)?;
        self.stages.get(idx)
    }

    pub fn max_score(&self) -> u32 {
        self.stages.iter().map(|s| s.points).sum()
    }
}

pub fn module_def(id: ModuleId) -> &'static ModuleDef {
    match id {
        ModuleId::Solar => &SOLAR,
        ModuleId::Wind => &WIND,
        ModuleId::Hydro => &HYDRO,
        ModuleId::Biomass => &BIOMASS,
    }
}

// ---------------------------------------------------------------------------
// Solar PV
// ---------------------------------------------------------------------------

pub static SOLAR: ModuleDef = ModuleDef {
    id: ModuleId::Solar,
    name: "Solar PV System",
    icon: "🔆",
    how_it_works: &[
        "PV Panel absorbs photons → generates DC current.",
        "Charge Controller prevents battery overcharge.",
        "Battery stores energy.",
        "Inverter converts DC → AC for appliances.",
    ],
    flow: &[
        "Sunlight",
        "PV Panel",
        "Charge Controller",
        "Battery",
        "Inverter",
        "AC Load",
    ],
    branches: &[],
    key_facts: &[
        "Efficiency: 18–23%",
        "Applications: rooftop, solar farms, satellites",
        "Nominal voltages: 12V, 24V, 48V DC",
    ],
    achievement: "Solar Specialist",
    stages: [
        StageSpec {
            title: "Component Arrangement",
            points: 2,
            hint: "Capture → Control → Store → Convert",
            feedback: "Wrong order.",
            kind: StageKind::Ordering {
                components: &["Inverter", "PV Panel", "Charge Controller", "Battery"],
                correct_order: &["PV Panel", "Charge Controller", "Battery", "Inverter"],
            },
        },
        StageSpec {
            title: "Concept Question",
            points: 2,
            hint: "More photons → more electron flow",
            feedback: "Think photons → electrons",
            kind: StageKind::Choice {
                prompt: "If sunlight intensity doubles (T constant), what happens?",
                options: &["Voltage doubles", "Current doubles", "Both halve", "No change"],
                correct_index: 1,
            },
        },
        StageSpec {
            title: "Quick Calculation",
            points: 1,
            hint: "300×5=1500 Wh → 1.5 kWh",
            feedback: "Energy=Power×Time; convert Wh→kWh",
            kind: StageKind::Numeric {
                prompt: "300W panel × 5 h → ? kWh",
                unit: "kWh",
                expected: 1.5,
                tolerance: 0.01,
                range: (0.0, 10.0),
            },
        },
        StageSpec {
            title: "Application Question",
            points: 2,
            hint: "Angle of incidence matters for energy capture.",
            feedback: "Not quite right.",
            kind: StageKind::Choice {
                prompt: "Why are solar panels often tilted at an angle instead of being flat?",
                options: &[
                    "To drain water",
                    "To prevent dust buildup",
                    "To maximize sunlight capture throughout the day",
                    "To reduce wind load",
                ],
                correct_index: 2,
            },
        },
        StageSpec {
            title: "Concept Question",
            points: 2,
            hint: "Appliances need AC power.",
            feedback: "Check the role of the inverter.",
            kind: StageKind::Choice {
                prompt: "What is the primary function of an inverter in a PV system?",
                options: &[
                    "To convert AC → DC",
                    "To store energy",
                    "To step up voltage",
                    "To convert DC → AC",
                ],
                correct_index: 3,
            },
        },
        StageSpec {
            title: "Bonus Calculation",
            points: 1,
            hint: "100×400=40000 W → 40 kW",
            feedback: "Recheck: 100×400 W → ?",
            kind: StageKind::Numeric {
                prompt: "A solar farm has 100 panels, each rated at 400W. \
                         What is the total nominal power output (in kW)?",
                unit: "kW",
                expected: 40.0,
                tolerance: 0.01,
                range: (0.0, 100.0),
            },
        },
    ],
};

// ---------------------------------------------------------------------------
// Wind
// ---------------------------------------------------------------------------

pub static WIND: ModuleDef = ModuleDef {
    id: ModuleId::Wind,
    name: "Wind Energy",
    icon: "🌪️",
    how_it_works: &[
        "Blades capture wind → spin shaft.",
        "Gearbox ups speed → Generator produces AC.",
        "Transformer steps up voltage → grid.",
    ],
    flow: &["Wind", "Blades", "Gearbox", "Generator", "Transformer", "Grid"],
    branches: &[],
    key_facts: &[
        "Theoretical max efficiency 59.3% (Betz limit)",
        "Real-world efficiency 35–45%",
        "Power ∝ wind speed³",
    ],
    achievement: "Wind Specialist",
    stages: [
        StageSpec {
            title: "Powertrain Order",
            points: 2,
            hint: "Mechanical capture→speed change→electrical→voltage",
            feedback: "Trace from wind→grid",
            kind: StageKind::Ordering {
                components: &["Generator", "Rotor Blades", "Gearbox", "Transformer"],
                correct_order: &["Rotor Blades", "Gearbox", "Generator", "Transformer"],
            },
        },
        StageSpec {
            title: "Physics Question",
            points: 2,
            hint: "v² in KE and additional v in mass flow",
            feedback: "Use P∝v³",
            kind: StageKind::Choice {
                prompt: "Doubling wind speed → new power?",
                options: &["2×", "4×", "8×", "16×"],
                correct_index: 2,
            },
        },
        StageSpec {
            title: "Efficiency Calc",
            points: 1,
            hint: "1000×0.4",
            feedback: "P_actual=P_theoretical×η",
            kind: StageKind::Numeric {
                prompt: "1000 kW theoretical × 40% = ? kW",
                unit: "kW",
                expected: 400.0,
                tolerance: 1.0,
                range: (0.0, 1000.0),
            },
        },
        StageSpec {
            title: "Application Question",
            points: 2,
            hint: "Blades & towers can fail under extreme loads.",
            feedback: "Think about safety limits.",
            kind: StageKind::Choice {
                prompt: "Why are wind turbines typically shut down during extremely high wind speeds?",
                options: &[
                    "To save wear and tear on the gearbox",
                    "To prevent over-voltage to the grid",
                    "To avoid structural damage to the blades and tower",
                    "To reduce noise pollution",
                ],
                correct_index: 2,
            },
        },
        StageSpec {
            title: "Concept Question",
            points: 2,
            hint: "It's the same principle that makes airplanes fly.",
            feedback: "Recheck fluid dynamics basics.",
            kind: StageKind::Choice {
                prompt: "What is the name of the aerodynamic principle that allows a wind \
                         turbine's blades to spin?",
                options: &[
                    "Bernoulli's principle",
                    "Pascal's law",
                    "Archimedes' principle",
                    "Newton's third law",
                ],
                correct_index: 0,
            },
        },
        StageSpec {
            title: "Bonus Calculation",
            points: 1,
            hint: "(5/10)³ × 2 MW",
            feedback: "Use cubic relation: P∝v³",
            kind: StageKind::Numeric {
                prompt: "A turbine's output is 2 MW at 10 m/s wind. \
                         What would be its output at 5 m/s (same efficiency)?",
                unit: "MW",
                expected: 0.25,
                tolerance: 0.01,
                range: (0.0, 5.0),
            },
        },
    ],
};

// ---------------------------------------------------------------------------
// Hydroelectric
// ---------------------------------------------------------------------------

pub static HYDRO: ModuleDef = ModuleDef {
    id: ModuleId::Hydro,
    name: "Hydroelectric Power",
    icon: "💧",
    how_it_works: &[
        "Reservoir stores water (PE=mgh).",
        "Water flows through Penstock → Turbine spins.",
        "Generator produces electricity; water exits via Tailrace.",
    ],
    flow: &["Reservoir", "Penstock", "Turbine", "Generator", "Grid"],
    branches: &[("Turbine", "Tailrace")],
    key_facts: &[
        "Efficiency: 85–95%",
        "PE=mgh",
        "Applications: dams, run-of-river, pumped storage",
    ],
    achievement: "Hydro Specialist",
    stages: [
        StageSpec {
            title: "Flow Order",
            points: 2,
            hint: "Start at reservoir, end at tailrace",
            feedback: "Trace water from stored→exit",
            kind: StageKind::Ordering {
                components: &["Turbine", "Reservoir", "Penstock", "Tailrace"],
                correct_order: &["Reservoir", "Penstock", "Turbine", "Tailrace"],
            },
        },
        StageSpec {
            title: "Concept Question",
            points: 2,
            hint: "PE=mgh → if h doubles, PE doubles",
            feedback: "Power∝head",
            kind: StageKind::Choice {
                prompt: "Double dam height → power?",
                options: &["Same", "2×", "4×", "½×"],
                correct_index: 1,
            },
        },
        StageSpec {
            title: "Energy Calc",
            points: 1,
            hint: "1000×9.8×50",
            feedback: "PE=mgh",
            kind: StageKind::Numeric {
                prompt: "1000 kg @ 50 m; g=9.8 → PE?",
                unit: "J",
                expected: 490_000.0,
                tolerance: 100.0,
                range: (0.0, 1_000_000.0),
            },
        },
        StageSpec {
            title: "Application Question",
            points: 2,
            hint: "Not all hydro needs massive dams.",
            feedback: "Think about small-scale systems.",
            kind: StageKind::Choice {
                prompt: "What is a 'run-of-river' hydroelectric plant?",
                options: &[
                    "A plant that uses a reservoir",
                    "A small plant that does not use a large dam",
                    "A plant for water purification",
                    "A plant that only works in winter",
                ],
                correct_index: 1,
            },
        },
        StageSpec {
            title: "Concept Question",
            points: 2,
            hint: "It's the height water falls.",
            feedback: "Check hydro power formula P∝h.",
            kind: StageKind::Choice {
                prompt: "In the context of hydropower, what does the term 'head' refer to?",
                options: &[
                    "The length of the dam",
                    "The volume of the reservoir",
                    "The vertical height difference the water falls",
                    "The water flow rate",
                ],
                correct_index: 2,
            },
        },
        StageSpec {
            title: "Bonus Calculation",
            points: 1,
            hint: "50×2=100 MWh",
            feedback: "Use E=P×t",
            kind: StageKind::Numeric {
                prompt: "A plant generates 50 MW. If it operates for 2 hours, \
                         how much energy (in MWh)?",
                unit: "MWh",
                expected: 100.0,
                tolerance: 1.0,
                range: (0.0, 500.0),
            },
        },
    ],
};

// ---------------------------------------------------------------------------
// Biomass
// ---------------------------------------------------------------------------

pub static BIOMASS: ModuleDef = ModuleDef {
    id: ModuleId::Biomass,
    name: "Biomass Energy",
    icon: "🌱",
    how_it_works: &[
        "Fuel burned in Furnace → heats Boiler → steam.",
        "Steam spins Turbine → drives Generator → electricity.",
    ],
    flow: &["Fuel", "Furnace", "Boiler", "Turbine", "Generator", "Grid"],
    branches: &[],
    key_facts: &[
        "Efficiency: 20–40%; CHP >80%",
        "Carbon-neutral cycle",
        "Fuels: wood, residues",
    ],
    achievement: "Biomass Specialist",
    stages: [
        StageSpec {
            title: "Process Order",
            points: 2,
            hint: "Burn→steam→spin→generate",
            feedback: "Trace heat→steam→motion→electricity",
            kind: StageKind::Ordering {
                components: &["Generator", "Furnace", "Boiler", "Turbine"],
                correct_order: &["Furnace", "Boiler", "Turbine", "Generator"],
            },
        },
        StageSpec {
            title: "Concept Question",
            points: 2,
            hint: "Latent heat of vaporization",
            feedback: "Consider energy to evaporate water",
            kind: StageKind::Choice {
                prompt: "Why is dry fuel more efficient than wet fuel?",
                options: &[
                    "Burns hotter",
                    "Less latent heat loss",
                    "Easier transport",
                    "Higher C content",
                ],
                correct_index: 1,
            },
        },
        StageSpec {
            title: "Efficiency Calc",
            points: 1,
            hint: "200×0.25",
            feedback: "Output = Input × Efficiency",
            kind: StageKind::Numeric {
                prompt: "200 MW input @ 25% → output?",
                unit: "MW",
                expected: 50.0,
                tolerance: 1.0,
                range: (0.0, 200.0),
            },
        },
        StageSpec {
            title: "Concept Question",
            points: 2,
            hint: "2nd-gen comes from non-food waste biomass.",
            feedback: "Check biofuel classification.",
            kind: StageKind::Choice {
                prompt: "Which of these is considered a 'second-generation' biofuel?",
                options: &[
                    "Corn ethanol",
                    "Palm oil",
                    "Wood pellets from forestry waste",
                    "Sugarcane",
                ],
                correct_index: 2,
            },
        },
        StageSpec {
            title: "Application Question",
            points: 2,
            hint: "CHP uses waste heat to raise total efficiency.",
            feedback: "Think about efficiency improvements.",
            kind: StageKind::Choice {
                prompt: "What is the primary advantage of a Combined Heat and Power (CHP) \
                         biomass plant?",
                options: &[
                    "It uses less fuel",
                    "It is easier to build",
                    "It has a much higher overall efficiency",
                    "It produces no emissions",
                ],
                correct_index: 2,
            },
        },
        StageSpec {
            title: "Bonus Calculation",
            points: 1,
            hint: "Energy_dry = 2000 / 0.8",
            feedback: "Recheck calculation.",
            kind: StageKind::Numeric {
                prompt: "If 100 kg of biomass contains 2000 MJ of energy, and its moisture \
                         content is 20%, what is the energy content of the dry biomass?",
                unit: "MJ",
                expected: 2500.0,
                tolerance: 10.0,
                range: (0.0, 5000.0),
            },
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Answer;

    #[test]
    fn test_every_module_is_worth_ten_points() {
        for id in ModuleId::ALL {
            let def = module_def(id);
            assert_eq!(def.id, id);
            assert_eq!(def.max_score(), 10, "{}", def.name);
            let points: Vec<u32> = def.stages.iter().map(|s| s.points).collect();
            assert_eq!(points, vec![2, 2, 1, 2, 2, 1]);
        }
    }

    #[test]
    fn test_stage_tables_are_well_formed() {
        for id in ModuleId::ALL {
            for (i, spec) in module_def(id).stages.iter().enumerate() {
                match &spec.kind {
                    StageKind::Ordering {
                        components,
                        correct_order,
                    } => {
                        let mut a = components.to_vec();
                        let mut b = correct_order.to_vec();
                        a.sort_unstable();
                        b.sort_unstable();
                        assert_eq!(a, b, "{:?} stage {}", id, i + 1);
                    }
                    StageKind::Choice {
                        options,
                        correct_index,
                        ..
                    } => assert!(*correct_index < options.len()),
                    StageKind::Numeric {
                        expected,
                        tolerance,
                        range,
                        ..
                    } => {
                        assert!(*tolerance > 0.0);
                        assert!(range.0 <= *expected && *expected <= range.1);
                    }
                }
                assert!(spec.is_correct(&spec.solution()));
                if !matches!(spec.kind, StageKind::Choice { .. }) {
                    assert!(!spec.is_correct(&spec.sentinel()), "{:?} stage {}", id, i + 1);
                }
            }
        }
    }

    #[test]
    fn test_stage_lookup_is_one_based() {
        assert_eq!(SOLAR.stage(1).map(|s| s.title), Some("Component Arrangement"));
        assert_eq!(SOLAR.stage(6).map(|s| s.title), Some("Bonus Calculation"));
        assert!(SOLAR.stage(0).is_none());
        assert!(SOLAR.stage(7).is_none());
    }

    #[test]
    fn test_tolerances_are_per_stage() {
        let hydro_calc = HYDRO.stage(3).unwrap();
        assert!(hydro_calc.is_correct(&Answer::Number(490_050.0)));
        assert!(!hydro_calc.is_correct(&Answer::Number(490_100.0)));

        let biomass_bonus = BIOMASS.stage(6).unwrap();
        assert!(biomass_bonus.is_correct(&Answer::Number(2509.0)));
        assert!(!biomass_bonus.is_correct(&Answer::Number(2490.0)));

        let solar_bonus = SOLAR.stage(6).unwrap();
        assert!(!solar_bonus.is_correct(&Answer::Number(40.5)));
    }

    #[test]
    fn test_lesson_serialization_skips_stages() {
        let v = serde_json::to_value(&HYDRO).unwrap();
        assert_eq!(v["id"], "hydro");
        assert_eq!(v["branches"][0][1], "Tailrace");
        assert!(v.get("stages").is_none());
    }
}
