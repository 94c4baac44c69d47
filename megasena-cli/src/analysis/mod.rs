pub mod ranking;

use megasena_db::models::{NumberStats, BALLS_PER_DRAW, BALL_MAX};

/// Frequência e atraso de cada dezena sobre uma janela de sorteios recentes.
/// `draws[0]` é o sorteio mais recente; o atraso é o número de sorteios desde
/// a última aparição da dezena.
pub fn compute_stats(draws: &[[u8; BALLS_PER_DRAW]]) -> Vec<NumberStats> {
    let mut stats: Vec<NumberStats> = (1..=BALL_MAX)
        .map(|n| NumberStats {
            number: n,
            frequency: 0,
            gap: 0,
        })
        .collect();

    for (i, balls) in draws.iter().enumerate() {
        for &n in balls {
            let idx = (n - 1) as usize;
            if idx < stats.len() {
                stats[idx].frequency += 1;
                if stats[idx].frequency == 1 {
                    stats[idx].gap = i as u32;
                }
            }
        }
    }

    for stat in &mut stats {
        if stat.frequency == 0 {
            stat.gap = draws.len() as u32;
        }
    }

    stats
}
