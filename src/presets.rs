//! Built-in machine constructors.
//!
//! The pair HMM here is the classic probabilistic Smith-Waterman transducer
//! with geometric gap lengths, optionally mixed over several geometric
//! components and optionally with separate insertion and deletion
//! parameters. All parameters are left free, so generated code reads them
//! from the runtime parameter table.

use crate::expr::{self, WeightExpr};
use crate::machine::{Machine, MachineState, MachineTransition, StateIndex};

/// Build a pairwise-alignment transducer over `alphabet`.
///
/// State layout, in index order: start `S`; per-component insert-extend
/// anchors `J`; the gap-to-delete pivot `W`; per-component delete-extend
/// anchors `X`; per-component inserters `I` (emit one output symbol,
/// weight `eqm{c}`); the match hub `M` (consume `c`, emit `d`, weight
/// `sub{c}{d}`, back to `S`); per-component deleters `D` (consume one
/// input symbol); accept `E`. Component labels are empty when
/// `mix_components` is 0, else `1..=mix_components`.
///
/// Gap lengths are geometric: `gapOpen`/`gapExtend`, split into
/// `insOpen`/`insExtend`/`delOpen`/`delExtend` when `irreversible`. Under a
/// mixture the open weights are `gapOpen{k}` with the leftover mass on the
/// free parameter `notGapOpen` (likewise for the irreversible stems).
///
/// Every null transition advances, so the result always validates.
pub fn pair_hmm(name: &str, alphabet: &str, mix_components: usize, irreversible: bool) -> Machine {
    let alph: Vec<String> = alphabet.chars().map(|c| c.to_string()).collect();
    let comps: Vec<String> = if mix_components == 0 {
        vec![String::new()]
    } else {
        (1..=mix_components).map(|k| k.to_string()).collect()
    };
    let m = comps.len();
    let mixed = mix_components > 0;

    let ins_stem = if irreversible { "ins" } else { "gap" };
    let del_stem = if irreversible { "del" } else { "gap" };
    let not_ins_open = || -> WeightExpr {
        if mixed {
            expr::param(if irreversible { "notInsOpen" } else { "notGapOpen" })
        } else {
            expr::not(expr::param(format!("{}Open", ins_stem)))
        }
    };
    let not_del_open = || -> WeightExpr {
        if mixed {
            expr::param(if irreversible { "notDelOpen" } else { "notGapOpen" })
        } else {
            expr::not(expr::param(format!("{}Open", del_stem)))
        }
    };
    let ins_open = |k: &str| expr::param(format!("{}Open{}", ins_stem, k));
    let ins_extend = |k: &str| expr::param(format!("{}Extend{}", ins_stem, k));
    let del_open = |k: &str| expr::param(format!("{}Open{}", del_stem, k));
    let del_extend = |k: &str| expr::param(format!("{}Extend{}", del_stem, k));

    // Index layout: S, J x m, W, X x m, I x m, M, D x m, E.
    let s_state: StateIndex = 0;
    let j_state = |k: usize| 1 + k;
    let w_state = 1 + m;
    let x_state = |k: usize| m + 2 + k;
    let i_state = |k: usize| 2 * m + 2 + k;
    let m_state = 3 * m + 2;
    let d_state = |k: usize| 3 * m + 3 + k;
    let e_state = 4 * m + 3;

    let null = |dest: StateIndex, weight: WeightExpr| {
        MachineTransition::new(None, None, dest, weight)
    };
    let state = |label: String, trans: Vec<MachineTransition>| MachineState {
        name: Some(format!("{}-{}", name, label)),
        trans,
    };

    let mut states = Vec::with_capacity(4 * m + 4);

    let mut s_trans: Vec<MachineTransition> = comps
        .iter()
        .enumerate()
        .map(|(k, label)| null(i_state(k), ins_open(label)))
        .collect();
    s_trans.push(null(w_state, not_ins_open()));
    states.push(state("S".to_string(), s_trans));

    for (k, label) in comps.iter().enumerate() {
        states.push(state(
            format!("J{}", label),
            vec![
                null(i_state(k), ins_extend(label)),
                null(w_state, expr::not(ins_extend(label))),
            ],
        ));
    }

    let mut w_trans = vec![null(m_state, not_del_open())];
    w_trans.extend(
        comps
            .iter()
            .enumerate()
            .map(|(k, label)| null(d_state(k), del_open(label))),
    );
    states.push(state("W".to_string(), w_trans));

    for (k, label) in comps.iter().enumerate() {
        states.push(state(
            format!("X{}", label),
            vec![
                null(d_state(k), del_extend(label)),
                null(m_state, expr::not(del_extend(label))),
            ],
        ));
    }

    for (k, label) in comps.iter().enumerate() {
        let trans = alph
            .iter()
            .map(|c| {
                MachineTransition::new(
                    None,
                    Some(c.clone()),
                    j_state(k),
                    expr::param(format!("eqm{}", c)),
                )
            })
            .collect();
        states.push(state(format!("I{}", label), trans));
    }

    let mut m_trans = vec![null(e_state, expr::one())];
    for c in &alph {
        for d in &alph {
            m_trans.push(MachineTransition::new(
                Some(c.clone()),
                Some(d.clone()),
                s_state,
                expr::param(format!("sub{}{}", c, d)),
            ));
        }
    }
    states.push(state("M".to_string(), m_trans));

    for (k, label) in comps.iter().enumerate() {
        let mut trans = vec![null(e_state, expr::one())];
        trans.extend(alph.iter().map(|c| {
            MachineTransition::new(Some(c.clone()), None, x_state(k), expr::one())
        }));
        states.push(state(format!("D{}", label), trans));
    }

    states.push(state("E".to_string(), vec![]));

    Machine {
        states,
        defs: vec![],
    }
}

// ─── Tests ────────────────────────────────────────────────────────
