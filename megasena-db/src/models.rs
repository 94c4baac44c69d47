use anyhow::{bail, Result};

pub const BALLS_PER_DRAW: usize = 6;
pub const BALL_MIN: u8 = 1;
pub const BALL_MAX: u8 = 60;

#[derive(Debug, Clone)]
pub struct Draw {
    pub contest: u32,
    pub date: String,
    pub balls: [u8; BALLS_PER_DRAW],
    pub winners: i32,
    pub prize: f64,
}

#[derive(Debug, Clone)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    pub gap: u32,
}

pub fn validate_draw(balls: &[u8; BALLS_PER_DRAW]) -> Result<()> {
    for &b in balls {
        if b < BALL_MIN || b > BALL_MAX {
            bail!("Dezena {} fora do intervalo (1-60)", b);
        }
    }
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            if balls[i] == balls[j] {
                bail!("Dezena em duplicidade: {}", balls[i]);
            }
        }
    }
    Ok(())
}
