//! Supply-chain network design instances.
//!
//! A four-echelon profit-maximisation model: products are made in
//! factories, shipped through warehouses to stores, and sold against a
//! per-store demand ceiling. Opening a warehouse or store costs rent;
//! unmet demand is penalised. All quantities and the open/closed decisions
//! are non-negative integers, so the whole model is a pure IP.
//!
//! The parameter generator produces integral data with guaranteed positive
//! per-unit margins, sized so that capacity is tight but the zero-activity
//! plan (everything closed, all demand unmet) stays feasible.

use crate::model::{Problem, Relation};

/// Generator hyper-parameters.
///
/// Defaults mirror a small but non-trivial network: three products, two
/// factories, one warehouse, two stores.
#[derive(Debug, Clone)]
pub struct ScConfig {
    /// Product count (I).
    pub products: usize,
    /// Factory count (J).
    pub factories: usize,
    /// Warehouse count (K).
    pub warehouses: usize,
    /// Store count (L).
    pub stores: usize,

    /// Unit volume of product i is `vol_start + vol_step·i`.
    pub vol_start: i64,
    pub vol_step: i64,

    /// Unit labour time is `time_base + i + (j mod 2)·time_parity_bonus`.
    pub time_base: i64,
    pub time_parity_bonus: i64,

    /// Base production cost `cost_base + cost_step·i`, spread across
    /// factories by a linear gradient of ±`cost_grad_pct` percent.
    pub cost_base: i64,
    pub cost_step: i64,
    pub cost_grad_pct: i64,

    /// Demand `demand_base + demand_i_step·i + demand_l_step·(l mod 4)`.
    pub demand_base: i64,
    pub demand_i_step: i64,
    pub demand_l_step: i64,

    /// Freight per unit volume, factory→warehouse and warehouse→store.
    pub tc1_base: i64,
    pub tc2_base: i64,
    pub tc_step: i64,

    /// Sales margin: `max(floor(margin_frac·min_cost), margin_floor_base
    /// + margin_floor_step·i)`, at least 1.
    pub margin_frac: f64,
    pub margin_floor_base: i64,
    pub margin_floor_step: i64,

    /// Unmet-demand penalty as a fraction of the price.
    pub penalty_frac: f64,

    /// Factory hour caps target `cap_util` of total demand hours, plus a
    /// small buffer.
    pub cap_util: f64,
    pub cap_buffer: i64,

    /// Warehouse volume throughput as a share of total demand volume.
    pub wh_capacity_share: f64,

    /// Fixed rents, kept small against the margins.
    pub wh_rent_base: i64,
    pub wh_rent_step: i64,
    pub store_rent_base: i64,
    pub store_rent_step: i64,
}

impl Default for ScConfig {
    fn default() -> Self {
        Self {
            products: 3,
            factories: 2,
            warehouses: 1,
            stores: 2,
            vol_start: 1,
            vol_step: 1,
            time_base: 1,
            time_parity_bonus: 1,
            cost_base: 200,
            cost_step: 100,
            cost_grad_pct: 8,
            demand_base: 20,
            demand_i_step: 5,
            demand_l_step: 3,
            tc1_base: 8,
            tc2_base: 9,
            tc_step: 2,
            margin_frac: 0.25,
            margin_floor_base: 20,
            margin_floor_step: 5,
            penalty_frac: 0.6,
            cap_util: 0.7,
            cap_buffer: 50,
            wh_capacity_share: 0.5,
            wh_rent_base: 2000,
            wh_rent_step: 200,
            store_rent_base: 6000,
            store_rent_step: 500,
        }
    }
}

impl ScConfig {
    /// Default hyper-parameters at the given network dimensions.
    pub fn with_dims(products: usize, factories: usize, warehouses: usize, stores: usize) -> Self {
        Self {
            products,
            factories,
            warehouses,
            stores,
            ..Self::default()
        }
    }
}

/// Generated instance data.
#[derive(Debug, Clone)]
pub struct ScParams {
    pub products: Vec<String>,
    pub factories: Vec<String>,
    pub warehouses: Vec<String>,
    pub stores: Vec<String>,

    /// Unit volume per product.
    pub volume: Vec<i64>,
    /// Sales price, product × store.
    pub price: Vec<Vec<i64>>,
    /// Demand ceiling, product × store.
    pub demand: Vec<Vec<i64>>,
    /// Unmet-demand penalty, product × store.
    pub penalty: Vec<Vec<i64>>,
    /// Production cost, product × factory.
    pub prod_cost: Vec<Vec<i64>>,
    /// Unit labour time, product × factory.
    pub prod_time: Vec<Vec<i64>>,
    /// Labour-hour cap per factory.
    pub factory_cap: Vec<i64>,
    /// Fixed rent per warehouse.
    pub wh_rent: Vec<i64>,
    /// Volume throughput cap per warehouse.
    pub wh_cap: Vec<i64>,
    /// Fixed rent per store.
    pub store_rent: Vec<i64>,
    /// Freight per unit volume, factory × warehouse.
    pub freight_fw: Vec<Vec<i64>>,
    /// Freight per unit volume, warehouse × store.
    pub freight_ws: Vec<Vec<i64>>,
}

fn product_names(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let base = (b'A' + (i % 26) as u8) as char;
            let round = i / 26;
            if round == 0 {
                base.to_string()
            } else {
                format!("{base}{}", round + 1)
            }
        })
        .collect()
}

fn seq_names(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{prefix}{i}")).collect()
}

/// Generates instance data from the hyper-parameters.
pub fn make_params(config: &ScConfig) -> ScParams {
    let (ni, nj, nk, nl) = (
        config.products,
        config.factories,
        config.warehouses,
        config.stores,
    );

    let volume: Vec<i64> = (0..ni)
        .map(|i| (config.vol_start + config.vol_step * i as i64).max(1))
        .collect();

    let prod_time: Vec<Vec<i64>> = (0..ni)
        .map(|i| {
            (0..nj)
                .map(|j| {
                    (config.time_base + i as i64 + (j as i64 % 2) * config.time_parity_bonus).max(1)
                })
                .collect()
        })
        .collect();

    // Base cost per product with a linear per-factory gradient of
    // ±cost_grad_pct percent.
    let prod_cost: Vec<Vec<i64>> = (0..ni)
        .map(|i| {
            let base = (config.cost_base + config.cost_step * i as i64).max(1);
            (0..nj)
                .map(|j| {
                    let shift = if nj > 1 {
                        (j as i64 * 2 * config.cost_grad_pct) / (nj as i64 - 1)
                            - config.cost_grad_pct
                    } else {
                        0
                    };
                    (base * (100 + shift) / 100).max(1)
                })
                .collect()
        })
        .collect();

    let demand: Vec<Vec<i64>> = (0..ni)
        .map(|i| {
            (0..nl)
                .map(|l| {
                    (config.demand_base
                        + config.demand_i_step * i as i64
                        + config.demand_l_step * (l as i64 % 4))
                        .max(0)
                })
                .collect()
        })
        .collect();

    let freight_fw: Vec<Vec<i64>> = (0..nj)
        .map(|j| {
            (0..nk)
                .map(|k| (config.tc1_base + config.tc_step * ((j as i64 % 3) + (k as i64 % 4))).max(0))
                .collect()
        })
        .collect();

    let freight_ws: Vec<Vec<i64>> = (0..nk)
        .map(|k| {
            (0..nl)
                .map(|l| (config.tc2_base + config.tc_step * ((k as i64 % 4) + (l as i64 % 4))).max(0))
                .collect()
        })
        .collect();

    // Cheapest production and cheapest per-volume route per store, used to
    // price every product above its landed cost.
    let min_cost: Vec<i64> = (0..ni)
        .map(|i| *prod_cost[i].iter().min().expect("at least one factory"))
        .collect();
    let min_ship_per_vol: Vec<i64> = (0..nl)
        .map(|l| {
            (0..nk)
                .map(|k| {
                    let cheapest_leg = *freight_fw
                        .iter()
                        .map(|row| &row[k])
                        .min()
                        .expect("at least one factory");
                    cheapest_leg + freight_ws[k][l]
                })
                .min()
                .expect("at least one warehouse")
        })
        .collect();

    let price: Vec<Vec<i64>> = (0..ni)
        .map(|i| {
            let floor_margin = config.margin_floor_base + config.margin_floor_step * i as i64;
            let margin = ((min_cost[i] as f64 * config.margin_frac).floor() as i64)
                .max(floor_margin)
                .max(1);
            (0..nl)
                .map(|l| {
                    let ship = volume[i] * min_ship_per_vol[l].max(0);
                    (min_cost[i] + ship + margin).max(min_cost[i] + ship + 1)
                })
                .collect()
        })
        .collect();

    let penalty: Vec<Vec<i64>> = (0..ni)
        .map(|i| {
            (0..nl)
                .map(|l| ((price[i][l] as f64 * config.penalty_frac).floor() as i64).max(0))
                .collect()
        })
        .collect();

    let total_demand: Vec<i64> = (0..ni).map(|i| demand[i].iter().sum()).collect();

    let factory_cap: Vec<i64> = (0..nj)
        .map(|j| {
            let hours: i64 = (0..ni).map(|i| total_demand[i] * prod_time[i][j]).sum();
            let cap =
                ((hours / nj.max(1) as i64) as f64 * config.cap_util).floor() as i64 + config.cap_buffer;
            cap.max(1)
        })
        .collect();

    let total_volume: i64 = (0..ni).map(|i| total_demand[i] * volume[i]).sum();
    let wh_cap: Vec<i64> = (0..nk)
        .map(|_| {
            ((total_volume as f64 * config.wh_capacity_share) / nk.max(1) as f64).floor() as i64
        })
        .map(|cap| cap.max(1))
        .collect();

    let wh_rent: Vec<i64> = (0..nk)
        .map(|k| config.wh_rent_base + config.wh_rent_step * (k as i64 + 1))
        .collect();
    let store_rent: Vec<i64> = (0..nl)
        .map(|l| config.store_rent_base + config.store_rent_step * (l as i64 + 1))
        .collect();

    ScParams {
        products: product_names(ni),
        factories: seq_names("F", nj),
        warehouses: seq_names("W", nk),
        stores: seq_names("S", nl),
        volume,
        price,
        demand,
        penalty,
        prod_cost,
        prod_time,
        factory_cap,
        wh_rent,
        wh_cap,
        store_rent,
        freight_fw,
        freight_ws,
    }
}

fn v_p(i: &str, j: &str) -> String {
    format!("P[{i},{j}]")
}
fn v_x(i: &str, j: &str, k: &str) -> String {
    format!("X[{i},{j},{k}]")
}
fn v_y(i: &str, k: &str, l: &str) -> String {
    format!("Y[{i},{k},{l}]")
}
fn v_u(i: &str, l: &str) -> String {
    format!("U[{i},{l}]")
}
fn v_w(k: &str) -> String {
    format!("W[{k}]")
}
fn v_s(l: &str) -> String {
    format!("S[{l}]")
}

fn add_constraint(problem: &mut Problem, terms: &[(f64, String)], relation: Relation, rhs: f64) {
    let refs: Vec<(f64, &str)> = terms.iter().map(|(c, n)| (*c, n.as_str())).collect();
    problem.add_constraint(&refs, relation, rhs);
}

/// Builds the profit-maximisation IP for the given instance data.
///
/// Variables: production `P[i,j]`, inbound shipments `X[i,j,k]`, outbound
/// shipments `Y[i,k,l]`, unmet demand `U[i,l]`, and the open/closed
/// binaries `W[k]`, `S[l]` (capped at 1 by constraint).
pub fn build_supply_chain(params: &ScParams) -> Problem {
    let prods = &params.products;
    let facs = &params.factories;
    let whs = &params.warehouses;
    let stores = &params.stores;

    // Net profit: revenue minus production, freight, rents, and penalties.
    let mut objective: Vec<(f64, String)> = Vec::new();
    for (i, p) in prods.iter().enumerate() {
        for (l, s) in stores.iter().enumerate() {
            for w in whs {
                objective.push((params.price[i][l] as f64, v_y(p, w, s)));
            }
        }
    }
    for (i, p) in prods.iter().enumerate() {
        for (j, f) in facs.iter().enumerate() {
            objective.push((-(params.prod_cost[i][j] as f64), v_p(p, f)));
        }
    }
    for (i, p) in prods.iter().enumerate() {
        for (j, f) in facs.iter().enumerate() {
            for (k, w) in whs.iter().enumerate() {
                let cost = params.freight_fw[j][k] * params.volume[i];
                objective.push((-(cost as f64), v_x(p, f, w)));
            }
        }
    }
    for (i, p) in prods.iter().enumerate() {
        for (k, w) in whs.iter().enumerate() {
            for (l, s) in stores.iter().enumerate() {
                let cost = params.freight_ws[k][l] * params.volume[i];
                objective.push((-(cost as f64), v_y(p, w, s)));
            }
        }
    }
    for (k, w) in whs.iter().enumerate() {
        objective.push((-(params.wh_rent[k] as f64), v_w(w)));
    }
    for (l, s) in stores.iter().enumerate() {
        objective.push((-(params.store_rent[l] as f64), v_s(s)));
    }
    for (i, p) in prods.iter().enumerate() {
        for (l, s) in stores.iter().enumerate() {
            objective.push((-(params.penalty[i][l] as f64), v_u(p, s)));
        }
    }

    let obj_refs: Vec<(f64, &str)> = objective.iter().map(|(c, n)| (*c, n.as_str())).collect();
    let mut problem = Problem::maximize(&obj_refs);

    // (1) Factory labour capacity.
    for (j, f) in facs.iter().enumerate() {
        let terms: Vec<(f64, String)> = prods
            .iter()
            .enumerate()
            .map(|(i, p)| (params.prod_time[i][j] as f64, v_p(p, f)))
            .collect();
        add_constraint(&mut problem, &terms, Relation::Leq, params.factory_cap[j] as f64);
    }

    // (2) Production leaves the factory: P = Σ_k X.
    for p in prods {
        for f in facs {
            let mut terms = vec![(1.0, v_p(p, f))];
            for w in whs {
                terms.push((-1.0, v_x(p, f, w)));
            }
            add_constraint(&mut problem, &terms, Relation::Eq, 0.0);
        }
    }

    // (3) Warehouse flow conservation: Σ_j X = Σ_l Y.
    for p in prods {
        for w in whs {
            let mut terms: Vec<(f64, String)> =
                facs.iter().map(|f| (1.0, v_x(p, f, w))).collect();
            for s in stores {
                terms.push((-1.0, v_y(p, w, s)));
            }
            add_constraint(&mut problem, &terms, Relation::Eq, 0.0);
        }
    }

    // (4) Warehouse volume throughput gated on the open binary.
    for (k, w) in whs.iter().enumerate() {
        let mut terms: Vec<(f64, String)> = Vec::new();
        for (i, p) in prods.iter().enumerate() {
            for f in facs {
                terms.push((params.volume[i] as f64, v_x(p, f, w)));
            }
        }
        terms.push((-(params.wh_cap[k] as f64), v_w(w)));
        add_constraint(&mut problem, &terms, Relation::Leq, 0.0);
    }

    // (5) Demand balance with unmet slack: Σ_k Y + U = D.
    for (i, p) in prods.iter().enumerate() {
        for (l, s) in stores.iter().enumerate() {
            let mut terms: Vec<(f64, String)> =
                whs.iter().map(|w| (1.0, v_y(p, w, s))).collect();
            terms.push((1.0, v_u(p, s)));
            add_constraint(&mut problem, &terms, Relation::Eq, params.demand[i][l] as f64);
        }
    }

    // (6) Unmet demand cannot exceed demand.
    for (i, p) in prods.iter().enumerate() {
        for (l, s) in stores.iter().enumerate() {
            let terms = vec![(1.0, v_u(p, s))];
            add_constraint(&mut problem, &terms, Relation::Leq, params.demand[i][l] as f64);
        }
    }

    // (7) Store activation, big-M = demand: Σ_k Y − D·S <= 0.
    for (i, p) in prods.iter().enumerate() {
        for (l, s) in stores.iter().enumerate() {
            let mut terms: Vec<(f64, String)> =
                whs.iter().map(|w| (1.0, v_y(p, w, s))).collect();
            terms.push((-(params.demand[i][l] as f64), v_s(s)));
            add_constraint(&mut problem, &terms, Relation::Leq, 0.0);
        }
    }

    // (8) Open/closed decisions are binary: var <= 1 on top of the
    // implicit non-negative integrality.
    for w in whs {
        add_constraint(&mut problem, &[(1.0, v_w(w))], Relation::Leq, 1.0);
    }
    for s in stores {
        add_constraint(&mut problem, &[(1.0, v_s(s))], Relation::Leq, 1.0);
    }

    problem
}

/// Convenience: generated instance at the given dimensions.
pub fn supply_chain(products: usize, factories: usize, warehouses: usize, stores: usize) -> Problem {
    build_supply_chain(&make_params(&ScConfig::with_dims(
        products, factories, warehouses, stores,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bnb::{IpSolution, SolveConfig, SolveStatus};

    /// Checks the incumbent against every stored constraint and returns it
    /// as an index-ordered point.
    fn assert_incumbent_feasible(problem: &Problem, result: &IpSolution) -> Vec<f64> {
        let mut point = vec![0.0; problem.var_count()];
        for (var, slot) in point.iter_mut().enumerate() {
            let name = problem.var_name(var).unwrap();
            *slot = result.value(name).expect("missing variable") as f64;
        }
        for (idx, c) in problem.constraints.iter().enumerate() {
            let lhs = c.expr.eval(&point);
            let ok = match c.relation {
                Relation::Leq => lhs <= c.rhs + 1e-6,
                Relation::Eq => (lhs - c.rhs).abs() <= 1e-6,
                Relation::Geq => lhs >= c.rhs - 1e-6,
            };
            assert!(ok, "constraint {idx} violated: {lhs} vs {}", c.rhs);
        }
        point
    }

    #[test]
    fn test_product_names_wrap_alphabet() {
        let names = product_names(28);
        assert_eq!(names[0], "A");
        assert_eq!(names[25], "Z");
        assert_eq!(names[26], "A2");
        assert_eq!(names[27], "B2");
    }

    #[test]
    fn test_params_dimensions() {
        let params = make_params(&ScConfig::with_dims(3, 2, 2, 4));
        assert_eq!(params.products.len(), 3);
        assert_eq!(params.factories, vec!["F1", "F2"]);
        assert_eq!(params.warehouses, vec!["W1", "W2"]);
        assert_eq!(params.stores.len(), 4);
        assert_eq!(params.price.len(), 3);
        assert_eq!(params.price[0].len(), 4);
        assert_eq!(params.freight_fw.len(), 2);
        assert_eq!(params.freight_fw[0].len(), 2);
        assert_eq!(params.freight_ws.len(), 2);
        assert_eq!(params.freight_ws[0].len(), 4);
    }

    #[test]
    fn test_prices_cover_landed_cost() {
        let params = make_params(&ScConfig::default());
        for (i, row) in params.price.iter().enumerate() {
            let min_cost = *params.prod_cost[i].iter().min().unwrap();
            for (l, &price) in row.iter().enumerate() {
                // The cheapest route's landed cost plus at least one unit
                // of margin.
                let cheapest_route: i64 = (0..params.warehouses.len())
                    .map(|k| {
                        params.freight_fw.iter().map(|r| r[k]).min().unwrap()
                            + params.freight_ws[k][l]
                    })
                    .min()
                    .unwrap();
                assert!(
                    price > min_cost + params.volume[i] * cheapest_route,
                    "product {i}, store {l}: price {price} below landed cost"
                );
            }
        }
    }

    #[test]
    fn test_model_shape() {
        let config = ScConfig::with_dims(2, 2, 1, 2);
        let problem = build_supply_chain(&make_params(&config));
        let (ni, nj, nk, nl) = (2, 2, 1, 2);
        // P + X + Y + U + W + S
        let expected_vars = ni * nj + ni * nj * nk + ni * nk * nl + ni * nl + nk + nl;
        assert_eq!(problem.var_count(), expected_vars);
        // Groups (1)..(8).
        let expected_cons =
            nj + ni * nj + ni * nk + nk + ni * nl + ni * nl + ni * nl + nk + nl;
        assert_eq!(problem.constraints.len(), expected_cons);
    }

    #[test]
    fn test_small_instance_solves_and_agrees() {
        let problem = supply_chain(2, 2, 1, 2);
        let serial = problem.solve();
        assert_eq!(serial.status, SolveStatus::Optimal);
        assert!(serial.extremum.is_finite());
        assert!(serial.nodes_solved >= 1);

        let threaded = problem.solve_parallel();
        assert_eq!(threaded.status, SolveStatus::Optimal);
        assert!(
            (serial.extremum - threaded.extremum).abs() < 1e-4,
            "serial {} vs parallel {}",
            serial.extremum,
            threaded.extremum
        );

        let lanes = problem.solve_with(&SolveConfig::default().with_vectorized(true));
        assert!((serial.extremum - lanes.extremum).abs() < 1e-4);
    }

    #[test]
    fn test_incumbent_satisfies_all_constraints() {
        let problem = supply_chain(2, 2, 1, 2);
        let result = problem.solve();
        assert_eq!(result.status, SolveStatus::Optimal);

        let point = assert_incumbent_feasible(&problem, &result);
        // The reported extremum matches the objective at the incumbent.
        let objective_value = problem.objective.eval(&point);
        assert!(
            (objective_value - result.extremum).abs() < 1e-3,
            "objective {objective_value} vs extremum {}",
            result.extremum
        );
    }

    /// The full three-by-three network (three products, factories,
    /// warehouses, and stores): serial and parallel drivers must agree on
    /// the optimum, and the incumbent must satisfy the whole model.
    #[test]
    fn test_three_by_three_network() {
        let problem = supply_chain(3, 3, 3, 3);
        let serial = problem.solve_with(&SolveConfig::default().with_vectorized(true));
        assert_eq!(serial.status, SolveStatus::Optimal);
        assert!(serial.extremum.is_finite());

        let threaded = problem.solve_parallel();
        assert_eq!(threaded.status, SolveStatus::Optimal);
        assert!(
            (serial.extremum - threaded.extremum).abs() < 1e-4,
            "serial {} vs parallel {}",
            serial.extremum,
            threaded.extremum
        );

        assert_incumbent_feasible(&problem, &serial);
    }

    #[test]
    fn test_zero_activity_plan_is_feasible() {
        // Shipping nothing and leaving all demand unmet must satisfy the
        // model, which guarantees solvability of every generated instance.
        let params = make_params(&ScConfig::default());
        let problem = build_supply_chain(&params);
        let mut point = vec![0.0; problem.var_count()];
        for (i, p) in params.products.iter().enumerate() {
            for (l, s) in params.stores.iter().enumerate() {
                let var = problem.var_index(&v_u(p, s)).unwrap();
                point[var] = params.demand[i][l] as f64;
            }
        }
        for c in &problem.constraints {
            let lhs = c.expr.eval(&point);
            let ok = match c.relation {
                Relation::Leq => lhs <= c.rhs + 1e-9,
                Relation::Eq => (lhs - c.rhs).abs() <= 1e-9,
                Relation::Geq => lhs >= c.rhs - 1e-9,
            };
            assert!(ok, "zero-activity plan violates a constraint");
        }
    }
}
