//! Typed input model for the `factory` solver: parses the JSON instance,
//! validates it, and derives the per-recipe rate/cost figures the reducer
//! needs.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::Error;
use crate::EPS;

/// A machine-cost sentinel for recipes whose effective rate is ~0, large
/// enough that the machine-minimization objective excludes them unless the
/// plan strictly requires them.
const UNUSABLE_MACHINE_COST: f64 = 1e30;

#[derive(Debug, Deserialize)]
pub struct RawInstance {
    pub machines: BTreeMap<String, RawMachine>,
    #[serde(default)]
    pub modules: BTreeMap<String, RawModule>,
    pub recipes: BTreeMap<String, RawRecipe>,
    pub limits: RawLimits,
    pub target: RawTarget,
}

#[derive(Debug, Deserialize)]
pub struct RawMachine {
    pub crafts_per_min: f64,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawModule {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub prod: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawRecipe {
    pub machine: String,
    pub time_s: f64,
    #[serde(default, rename = "in")]
    pub input: BTreeMap<String, f64>,
    #[serde(default)]
    pub out: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawLimits {
    #[serde(default)]
    pub max_machines: BTreeMap<String, f64>,
    #[serde(default)]
    pub raw_supply_per_min: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawTarget {
    pub item: String,
    pub rate_per_min: f64,
}

#[derive(Debug, Clone)]
pub struct Machine {
    pub name: String,
    pub crafts_per_min: f64,
    pub max_count: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub machine: String,
    pub input: BTreeMap<String, f64>,
    pub output: BTreeMap<String, f64>,
    /// Crafts a single machine of this type executes per minute.
    pub effective_crafts_per_min: f64,
    /// Machines required per craft-per-minute of this recipe.
    pub machine_cost_per_craft: f64,
    /// Multiplier applied to outputs only (productivity bonus).
    pub productivity_mult: f64,
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub machines: BTreeMap<String, Machine>,
    pub recipes: Vec<Recipe>,
    pub raw_supply: BTreeMap<String, f64>,
    pub target_item: String,
    pub target_rate: f64,
    pub raw_items: BTreeSet<String>,
    pub intermediate_items: BTreeSet<String>,
}

impl Instance {
    pub fn from_raw(raw: RawInstance) -> Result<Self, Error> {
        for (name, m) in &raw.machines {
            if !m.crafts_per_min.is_finite() || m.crafts_per_min < 0.0 {
                return Err(Error::Model(format!(
                    "machine {name}: crafts_per_min must be finite and nonnegative"
                )));
            }
        }
        for (item, cap) in &raw.limits.raw_supply_per_min {
            if !cap.is_finite() || *cap < 0.0 {
                return Err(Error::Model(format!(
                    "raw supply cap for {item} must be finite and nonnegative"
                )));
            }
        }
        for (name, cap) in &raw.limits.max_machines {
            if !cap.is_finite() || *cap < 0.0 {
                return Err(Error::Model(format!(
                    "machine cap for {name} must be finite and nonnegative"
                )));
            }
        }
        if !raw.target.rate_per_min.is_finite() || raw.target.rate_per_min < 0.0 {
            return Err(Error::Model(
                "target.rate_per_min must be finite and nonnegative".into(),
            ));
        }

        let machines: BTreeMap<String, Machine> = raw
            .machines
            .iter()
            .map(|(name, m)| {
                (
                    name.clone(),
                    Machine {
                        name: name.clone(),
                        crafts_per_min: m.crafts_per_min,
                        max_count: raw.limits.max_machines.get(name).copied(),
                    },
                )
            })
            .collect();

        let mut recipes = Vec::with_capacity(raw.recipes.len());
        for (name, r) in &raw.recipes {
            let machine = machines.get(&r.machine).ok_or_else(|| {
                Error::Model(format!(
                    "recipe {name} references unknown machine {}",
                    r.machine
                ))
            })?;
            if r.time_s <= 0.0 || !r.time_s.is_finite() {
                return Err(Error::Model(format!(
                    "recipe {name}: time_s must be finite and positive"
                )));
            }
            for (item, qty) in r.input.iter().chain(r.out.iter()) {
                if !qty.is_finite() || *qty < 0.0 {
                    return Err(Error::Model(format!(
                        "recipe {name}: quantity of {item} must be finite and nonnegative"
                    )));
                }
            }

            let module = raw.modules.get(&r.machine);
            let mod_speed = module.map_or(0.0, |m| m.speed);
            let mod_prod = module.map_or(0.0, |m| m.prod);

            let effective_crafts_per_min =
                machine.crafts_per_min * (1.0 + mod_speed) * 60.0 / r.time_s;
            let machine_cost_per_craft = if effective_crafts_per_min <= EPS {
                UNUSABLE_MACHINE_COST
            } else {
                1.0 / effective_crafts_per_min
            };

            recipes.push(Recipe {
                name: name.clone(),
                machine: r.machine.clone(),
                input: r.input.clone(),
                output: r.out.clone(),
                effective_crafts_per_min,
                machine_cost_per_craft,
                productivity_mult: 1.0 + mod_prod,
            });
        }

        let raw_items: BTreeSet<String> = raw.limits.raw_supply_per_min.keys().cloned().collect();

        let mut intermediate_items = BTreeSet::new();
        for r in &recipes {
            for item in r.input.keys().chain(r.output.keys()) {
                if !raw_items.contains(item) && *item != raw.target.item {
                    intermediate_items.insert(item.clone());
                }
            }
        }

        Ok(Instance {
            machines,
            recipes,
            raw_supply: raw.limits.raw_supply_per_min,
            target_item: raw.target.item,
            target_rate: raw.target.rate_per_min,
            raw_items,
            intermediate_items,
        })
    }
}
