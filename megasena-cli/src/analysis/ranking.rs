use std::cmp::Reverse;

use thiserror::Error;

use megasena_db::models::{BALLS_PER_DRAW, BALL_MAX, BALL_MIN};

use crate::dataset::DrawTable;

pub const TIER_COUNT: usize = 3;
pub const RANKED_POOL: usize = TIER_COUNT * BALLS_PER_DRAW;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("coluna '{column}' ausente no conjunto de dados")]
    SchemaMismatch { column: String },

    #[error("valor inválido na linha {row}, coluna '{column}': '{value}' (esperado inteiro entre 1 e 60)")]
    MalformedInput {
        row: usize,
        column: String,
        value: String,
    },

    #[error("dados insuficientes: {distinct} dezenas distintas, são necessárias 18")]
    InsufficientData { distinct: usize },
}

/// Contagem de ocorrências por dezena, acumulada em ordem de varredura
/// linha-depois-coluna. A ordem de primeira aparição é preservada: é ela que
/// desempata dezenas com a mesma contagem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTally {
    counts: [u32; (BALL_MAX as usize) + 1],
    first_seen: Vec<u8>,
}

impl FrequencyTally {
    fn new() -> Self {
        Self {
            counts: [0; (BALL_MAX as usize) + 1],
            first_seen: Vec::new(),
        }
    }

    fn record(&mut self, value: u8) {
        if self.counts[value as usize] == 0 {
            self.first_seen.push(value);
        }
        self.counts[value as usize] += 1;
    }

    pub fn count(&self, value: u8) -> u32 {
        self.counts[value as usize]
    }

    pub fn distinct(&self) -> usize {
        self.first_seen.len()
    }

    /// Todas as dezenas do domínio com suas contagens (incluindo zero),
    /// para o gráfico de frequências.
    pub fn counts(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        (BALL_MIN..=BALL_MAX).map(|n| (n, self.counts[n as usize]))
    }

    /// Dezenas distintas em ordem de frequência decrescente. O sort é estável
    /// sobre a ordem de primeira aparição, então empates mantêm a dezena vista
    /// primeiro à frente.
    pub fn ranked(&self) -> Vec<u8> {
        let mut ranked = self.first_seen.clone();
        ranked.sort_by_key(|&n| Reverse(self.counts[n as usize]));
        ranked
    }
}

/// As três linhas de jogo: cada uma com seis dezenas em ordem crescente.
/// A posição no ranking decide a que linha uma dezena pertence; dentro da
/// linha a ordem é apenas de apresentação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSet {
    pub tiers: [[u8; BALLS_PER_DRAW]; TIER_COUNT],
}

/// Varre as seis colunas de dezenas de todas as linhas e conta ocorrências.
///
/// Falha com `SchemaMismatch` se alguma coluna nomeada não existir no
/// cabeçalho, e com `MalformedInput` se alguma célula não for um inteiro
/// entre 1 e 60 (nenhuma coerção além do parse).
pub fn tally(table: &DrawTable, ball_columns: &[String; 6]) -> Result<FrequencyTally, RankingError> {
    let mut indices = [0usize; BALLS_PER_DRAW];
    for (slot, column) in ball_columns.iter().enumerate() {
        indices[slot] = table
            .column_index(column)
            .ok_or_else(|| RankingError::SchemaMismatch {
                column: column.clone(),
            })?;
    }

    let mut tally = FrequencyTally::new();
    for row_idx in 0..table.rows().len() {
        for (slot, &col_idx) in indices.iter().enumerate() {
            let raw = table.cell(row_idx, col_idx).unwrap_or("");
            let value = raw.parse::<u8>().ok().filter(|v| (BALL_MIN..=BALL_MAX).contains(v));
            match value {
                Some(v) => tally.record(v),
                None => {
                    return Err(RankingError::MalformedInput {
                        row: row_idx + 1,
                        column: ball_columns[slot].clone(),
                        value: raw.to_string(),
                    })
                }
            }
        }
    }

    Ok(tally)
}

/// Particiona as 18 dezenas mais frequentes em três linhas de seis, na ordem
/// do ranking, e ordena cada linha de forma crescente para exibição.
///
/// Falha com `InsufficientData` se o domínio tiver menos de 18 dezenas
/// distintas: nunca completa nem trunca linhas silenciosamente.
pub fn tiers_from_tally(tally: &FrequencyTally) -> Result<TierSet, RankingError> {
    if tally.distinct() < RANKED_POOL {
        return Err(RankingError::InsufficientData {
            distinct: tally.distinct(),
        });
    }

    let ranked = tally.ranked();
    let mut tiers = [[0u8; BALLS_PER_DRAW]; TIER_COUNT];
    for (t, tier) in tiers.iter_mut().enumerate() {
        let start = t * BALLS_PER_DRAW;
        tier.copy_from_slice(&ranked[start..start + BALLS_PER_DRAW]);
        tier.sort();
    }

    Ok(TierSet { tiers })
}

/// Operação completa: contagem + partição em três linhas. Função pura, sem
/// E/S; chamadas repetidas sobre a mesma tabela produzem o mesmo resultado.
pub fn rank(table: &DrawTable, ball_columns: &[String; 6]) -> Result<TierSet, RankingError> {
    tiers_from_tally(&tally(table, ball_columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DEFAULT_BALL_COLUMNS;

    fn ball_columns() -> [String; 6] {
        DEFAULT_BALL_COLUMNS.map(String::from)
    }

    fn table_from_rows(rows: &[[u8; 6]]) -> DrawTable {
        DrawTable::new(
            DEFAULT_BALL_COLUMNS.map(String::from).to_vec(),
            rows.iter()
                .map(|r| r.iter().map(|n| n.to_string()).collect())
                .collect(),
        )
    }

    fn table_from_flat(values: &[u8]) -> DrawTable {
        assert_eq!(values.len() % 6, 0);
        DrawTable::new(
            DEFAULT_BALL_COLUMNS.map(String::from).to_vec(),
            values
                .chunks(6)
                .map(|r| r.iter().map(|n| n.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_rank_deterministic() {
        let rows: Vec<[u8; 6]> = (0..4)
            .map(|i| {
                let base = i * 6;
                [
                    base + 1,
                    base + 2,
                    base + 3,
                    base + 4,
                    base + 5,
                    base + 6,
                ]
            })
            .collect();
        let table = table_from_rows(&rows);
        let first = rank(&table, &ball_columns()).unwrap();
        let second = rank(&table, &ball_columns()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tiers_disjoint_and_ascending() {
        // 24 dezenas distintas, contagens variadas
        let mut values = Vec::new();
        for n in 1u8..=24 {
            for _ in 0..(25 - n) {
                values.push(n);
            }
        }
        while values.len() % 6 != 0 {
            values.push(1);
        }
        let table = table_from_flat(&values);
        let result = rank(&table, &ball_columns()).unwrap();

        let mut all: Vec<u8> = result.tiers.iter().flatten().copied().collect();
        assert_eq!(all.len(), 18);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 18, "dezenas repetidas entre as linhas");

        for tier in &result.tiers {
            for pair in tier.windows(2) {
                assert!(pair[0] < pair[1], "linha fora de ordem: {:?}", tier);
            }
        }
    }

    #[test]
    fn test_exact_eighteen_unique_counts() {
        // Dezena n aparece 19-n vezes (contagens 18..1, todas distintas),
        // mais três ocorrências extras da dezena 1 para fechar linhas de 6.
        let mut values = Vec::new();
        for n in 1u8..=18 {
            for _ in 0..(19 - n) {
                values.push(n);
            }
        }
        values.extend_from_slice(&[1, 1, 1]);
        assert_eq!(values.len() % 6, 0);

        let table = table_from_flat(&values);
        let result = rank(&table, &ball_columns()).unwrap();
        assert_eq!(result.tiers[0], [1, 2, 3, 4, 5, 6]);
        assert_eq!(result.tiers[1], [7, 8, 9, 10, 11, 12]);
        assert_eq!(result.tiers[2], [13, 14, 15, 16, 17, 18]);
    }

    #[test]
    fn test_row_order_irrelevant_with_unique_counts() {
        let mut values = Vec::new();
        for n in 1u8..=18 {
            for _ in 0..(19 - n) {
                values.push(n);
            }
        }
        values.extend_from_slice(&[1, 1, 1]);

        let forward = table_from_flat(&values);
        let rows: Vec<Vec<String>> = forward.rows().iter().rev().cloned().collect();
        let reversed = DrawTable::new(forward.headers().to_vec(), rows);

        assert_eq!(
            rank(&forward, &ball_columns()).unwrap(),
            rank(&reversed, &ball_columns()).unwrap()
        );
    }

    #[test]
    fn test_tie_break_first_seen() {
        // 13..17 aparecem duas vezes; todas as demais uma vez. As dezenas 18 e
        // 19 empatam em contagem na fronteira do top 18: entra a vista primeiro.
        let rows = [
            [1, 2, 3, 4, 5, 6],
            [7, 8, 9, 10, 11, 12],
            [13, 14, 15, 16, 17, 18],
            [13, 14, 15, 16, 17, 19],
        ];
        let table = table_from_rows(&rows);
        let result = rank(&table, &ball_columns()).unwrap();
        let all: Vec<u8> = result.tiers.iter().flatten().copied().collect();
        assert!(all.contains(&18));
        assert!(!all.contains(&19));

        // Invertendo a primeira aparição entre 18 e 19, o desempate inverte.
        let rows = [
            [1, 2, 3, 4, 5, 6],
            [7, 8, 9, 10, 11, 12],
            [13, 14, 15, 16, 17, 19],
            [13, 14, 15, 16, 17, 18],
        ];
        let table = table_from_rows(&rows);
        let result = rank(&table, &ball_columns()).unwrap();
        let all: Vec<u8> = result.tiers.iter().flatten().copied().collect();
        assert!(all.contains(&19));
        assert!(!all.contains(&18));
    }

    #[test]
    fn test_tie_break_stable_under_row_permutation() {
        // As duas últimas linhas só repetem dezenas já vistas: trocá-las de
        // lugar preserva a posição de primeira aparição de todas as dezenas
        // e portanto não pode mudar o resultado.
        let rows = [
            [1, 2, 3, 4, 5, 6],
            [7, 8, 9, 10, 11, 12],
            [13, 14, 15, 16, 17, 18],
            [13, 14, 15, 16, 17, 19],
            [1, 2, 3, 4, 5, 6],
            [7, 8, 9, 10, 11, 12],
        ];
        let permuted = [
            [1, 2, 3, 4, 5, 6],
            [7, 8, 9, 10, 11, 12],
            [13, 14, 15, 16, 17, 18],
            [13, 14, 15, 16, 17, 19],
            [7, 8, 9, 10, 11, 12],
            [1, 2, 3, 4, 5, 6],
        ];
        assert_eq!(
            rank(&table_from_rows(&rows), &ball_columns()).unwrap(),
            rank(&table_from_rows(&permuted), &ball_columns()).unwrap()
        );
    }

    #[test]
    fn test_insufficient_distinct() {
        // 10 dezenas distintas em várias linhas
        let rows = [
            [1, 2, 3, 4, 5, 6],
            [1, 2, 3, 4, 5, 7],
            [5, 6, 7, 8, 9, 10],
        ];
        let err = rank(&table_from_rows(&rows), &ball_columns()).unwrap_err();
        match err {
            RankingError::InsufficientData { distinct } => assert_eq!(distinct, 10),
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_eight_distinct_values_rejected() {
        let rows = [
            [1, 2, 3, 4, 5, 6],
            [1, 2, 3, 4, 5, 7],
            [1, 2, 3, 4, 5, 8],
        ];
        let err = rank(&table_from_rows(&rows), &ball_columns()).unwrap_err();
        match err {
            RankingError::InsufficientData { distinct } => assert_eq!(distinct, 8),
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_schema_mismatch() {
        let headers = vec![
            "Ball1".to_string(),
            "Ball2".to_string(),
            "Ball3".to_string(),
            "Ball4".to_string(),
            "Ball5".to_string(),
        ];
        let table = DrawTable::new(headers, vec![]);
        let err = rank(&table, &ball_columns()).unwrap_err();
        match err {
            RankingError::SchemaMismatch { column } => assert_eq!(column, "Ball6"),
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_cells() {
        for bad in ["abc", "61", "0", "", "4.0"] {
            let mut row: Vec<String> = vec!["1", "2", "3", "4", "5"]
                .into_iter()
                .map(String::from)
                .collect();
            row.push(bad.to_string());
            let table = DrawTable::new(DEFAULT_BALL_COLUMNS.map(String::from).to_vec(), vec![row]);
            let err = rank(&table, &ball_columns()).unwrap_err();
            match err {
                RankingError::MalformedInput { row, column, value } => {
                    assert_eq!(row, 1);
                    assert_eq!(column, "Ball6");
                    assert_eq!(value, bad);
                }
                other => panic!("erro inesperado para '{bad}': {other:?}"),
            }
        }
    }

    #[test]
    fn test_tally_exports_full_domain() {
        let rows = [[1, 2, 3, 4, 5, 6]];
        let tally = tally(&table_from_rows(&rows), &ball_columns()).unwrap();
        let counts: Vec<(u8, u32)> = tally.counts().collect();
        assert_eq!(counts.len(), 60);
        assert_eq!(counts[0], (1, 1));
        assert_eq!(counts[5], (6, 1));
        assert_eq!(counts[59], (60, 0));
        assert_eq!(tally.distinct(), 6);
    }
}
