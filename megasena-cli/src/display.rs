use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use textplots::Plot;

use megasena_db::models::{Draw, NumberStats};

use crate::analysis::ranking::{FrequencyTally, TierSet};
use crate::import::ImportResult;

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Nenhum sorteio para exibir.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Concurso", "Data", "Dezenas", "Ganhadores", "Prêmio"]);

    for draw in draws {
        let mut sorted_balls = draw.balls;
        sorted_balls.sort();

        let balls_str = sorted_balls
            .iter()
            .map(|b| format!("{:02}", b))
            .collect::<Vec<_>>()
            .join(" - ");

        let prize = if draw.prize > 0.0 {
            format!("R$ {:.2}", draw.prize)
        } else {
            "—".to_string()
        };

        table.add_row(vec![
            &draw.contest.to_string(),
            &draw.date,
            &balls_str,
            &draw.winners.to_string(),
            &prize,
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Importação concluída:");
    println!("  Total de linhas lidas : {}", result.total_records);
    println!("  Inseridos             : {}", result.inserted);
    println!("  Duplicados ignorados  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erros                 : {}", result.errors);
    }
}

pub fn display_stats(stats: &[NumberStats], window: u32) {
    println!("\n📊 Estatísticas sobre os últimos {} sorteios\n", window);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Dezena", "Frequência", "Atraso"]);

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    for stat in &sorted {
        table.add_row(vec![
            &format!("{:02}", stat.number),
            &stat.frequency.to_string(),
            &stat.gap.to_string(),
        ]);
    }
    println!("{table}");
}

const TIER_LABELS: [&str; 3] = [
    "Linha 1 (Mais Frequentes)",
    "Linha 2 (Nível 2)",
    "Linha 3 (Nível 3)",
];

pub fn display_tiers(tiers: &TierSet, latest_date: Option<&str>) {
    println!("\n🎱 Linhas sugeridas (com base na frequência histórica)\n");
    if let Some(date) = latest_date {
        println!("Último concurso considerado: {}\n", date);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Linha", "Dezenas"]);

    for (label, tier) in TIER_LABELS.iter().zip(tiers.tiers.iter()) {
        let balls_str = tier
            .iter()
            .map(|b| format!("{:02}", b))
            .collect::<Vec<_>>()
            .join(" - ");
        table.add_row(vec![*label, &balls_str]);
    }
    println!("{table}");
}

pub fn display_frequency_chart(tally: &FrequencyTally) {
    println!("\n== Frequência por dezena (1-60) ==\n");

    let points: Vec<(f32, f32)> = tally
        .counts()
        .map(|(n, count)| (n as f32, count as f32))
        .collect();

    let y_max = points.iter().map(|(_, c)| *c).fold(0.0f32, f32::max);
    if y_max == 0.0 {
        println!("  (Sem dados para exibir)");
        return;
    }

    let shape = textplots::Shape::Bars(&points);
    let mut chart = textplots::Chart::new_with_y_range(120, 40, 1.0, 60.0, 0.0, y_max + 1.0);
    println!("{}", chart.lineplot(&shape));
}
