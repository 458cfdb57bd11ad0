use clap::Parser;
use once_cell::sync::Lazy;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// An ambient, pointer-reactive particle background.
pub struct Args {
    /// Initial window size, as width,height
    #[arg(long, default_value = "1280,720", value_parser = parse_win)]
    pub win: (f32, f32),

    /// Hard cap on the particle count, click bursts included
    #[arg(long, default_value = "300")]
    pub max_particles: usize,
    /// Cap on the batch created when the field (re)initializes
    #[arg(long, default_value = "150")]
    pub spawn_cap: usize,
    /// Square pixels of surface per particle
    #[arg(long, default_value = "8000")]
    pub area_per_particle: f32,
    /// Particles added per mouse click
    #[arg(long, default_value = "5")]
    pub click_burst: usize,
    /// Distance within which the pointer influences particles
    #[arg(long, default_value = "200")]
    pub interaction_radius: f32,
    /// Distance within which two particles are joined by a line
    #[arg(long, default_value = "150")]
    pub connect_distance: f32,
}

fn parse_win(value: &str) -> Result<(f32, f32), String> {
    let (w, h) = value
        .split_once(',')
        .ok_or_else(|| format!("expected width,height, got {value:?}"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f32>()
            .map_err(|e| format!("bad dimension {s:?}: {e}"))
            .and_then(|v| if v > 0.0 { Ok(v) } else { Err(format!("dimension must be positive, got {v}")) })
    };
    Ok((parse(w)?, parse(h)?))
}

pub static ARGS: Lazy<Args> = Lazy::new(Args::parse);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_win_accepts_width_comma_height() {
        assert_eq!(parse_win("1280,720"), Ok((1280.0, 720.0)));
        assert_eq!(parse_win("640, 480"), Ok((640.0, 480.0)));
    }

    #[test]
    fn parse_win_rejects_garbage() {
        assert!(parse_win("1280").is_err());
        assert!(parse_win("w,h").is_err());
        assert!(parse_win("0,720").is_err());
    }
}
