use loadings::partition::fractions;
use loadings::prelude::*;
use loadings::routing;
use loadings::state::StateVariables;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1e-12)
}

fn pools(st: &StateVariables) -> [f64; 7] {
    [st.maccu, st.msurfstor, st.mlatstor, st.mperstor, st.msoil, st.msa, st.mda]
}

fn buildup() -> impl Strategy<Value = BuildUp> {
    prop_oneof![
        Just(BuildUp::Power),
        Just(BuildUp::Exponential),
        Just(BuildUp::Saturation),
        Just(BuildUp::HalfSaturation),
    ]
}

fn washoff() -> impl Strategy<Value = WashOff> {
    prop_oneof![
        Just(WashOff::Exponential),
        Just(WashOff::FlowExponential),
        Just(WashOff::RatingCurve),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn loads_are_conserved_and_nonnegative(
        seed in any::<u64>(),
        wet in 0.0_f64..1.0,
        mean in 0.5_f64..40.0,
        days in 1_usize..40,
        bu in buildup(),
        wo in washoff(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sim = Synthetic::new()
            .subbasins(2)
            .units(2)
            .days(days)
            .methods(bu, wo)
            .rain(wet, mean)
            .unwrap()
            .simulation(&mut rng)
            .unwrap();
        let mut report = MemoryReport::new();
        sim.run(&mut report, |_| {}).unwrap();

        for row in &report.hru {
            let parts = [row.msur, row.mlat, row.mgw, row.mdgw];
            prop_assert!(parts.iter().all(|m| m.is_finite() && *m >= 0.0));
            prop_assert!(close(row.mt, parts.iter().sum()));
            let concs = [row.ct, row.clat, row.cgw, row.cdgw, row.ctsoil];
            prop_assert!(concs.iter().all(|c| c.is_finite() && *c >= 0.0));
        }
        for row in &report.sub {
            let parts = [row.msur, row.mlat, row.mgw, row.mdgw, row.mflux, row.mocp];
            prop_assert!(parts.iter().all(|m| *m >= 0.0));
            prop_assert!(close(row.mt, parts.iter().sum()));
        }
        for sub in sim.subbasins() {
            for unit in &sub.units {
                for st in &unit.state {
                    prop_assert!(pools(st).iter().all(|m| m.is_finite() && *m >= 0.0));
                }
            }
        }
    }

    #[test]
    fn phase_fractions_partition_unity(
        theta in 0.01_f64..0.6,
        kdoc in 0.0_f64..1e6,
        cwdoc in 0.0_f64..100.0,
        kp in 0.0_f64..1e5,
    ) {
        let (fd, fp, fdoc) = fractions(theta, kdoc, cwdoc, kp);
        prop_assert!(fd > 0.0 && fp >= 0.0 && fdoc >= 0.0);
        prop_assert!(close(fd + fp + fdoc, 1.0));
    }

    #[test]
    fn recharge_router_conserves_mass(
        mper in 0.0_f64..10.0,
        stored in 0.0_f64..10.0,
        delay in -5.0_f64..500.0,
    ) {
        let (recharge, left) = routing::recharge_lag(mper, stored, delay);
        prop_assert!(recharge >= 0.0 && left >= -1e-12);
        prop_assert!(close(recharge + left, mper + stored) || (mper + stored) == 0.0);
    }
}
