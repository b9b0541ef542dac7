//! Controller commands and the whitespace-separated script that spells them.
//!
//! Single-letter tokens follow the classic viewer key bindings:
//!
//! | token | action                     |
//! |-------|----------------------------|
//! | `w a s d` | pan up / left / down / right |
//! | `q` / `z` | zoom in / out            |
//! | `r`   | reset view                 |
//! | `x` / `c` / `v` | next / previous / first color scheme |
//! | `t`   | toggle blur                |
//! | `+` / `-` | one worker more / fewer |
//!
//! Mouse drags and window resizes take arguments:
//! `drag:X0,Y0,X1,Y1` (corner rectangle), `center:X0,Y0,X1,Y1` (rectangle
//! centred on the first point) and `size:WxH`.

use std::str::FromStr;

use zmand_core::{Direction, ScreenPoint};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pan(Direction),
    ZoomIn,
    ZoomOut,
    ResetView,
    NextScheme,
    PrevScheme,
    ResetScheme,
    ToggleBlur,
    MoreWorkers,
    FewerWorkers,
    Drag { a: ScreenPoint, b: ScreenPoint },
    DragCentered { center: ScreenPoint, edge: ScreenPoint },
    Resize { width: u32, height: u32 },
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let cmd = match token {
            "w" => Self::Pan(Direction::Up),
            "a" => Self::Pan(Direction::Left),
            "s" => Self::Pan(Direction::Down),
            "d" => Self::Pan(Direction::Right),
            "q" => Self::ZoomIn,
            "z" => Self::ZoomOut,
            "r" => Self::ResetView,
            "x" => Self::NextScheme,
            "c" => Self::PrevScheme,
            "v" => Self::ResetScheme,
            "t" => Self::ToggleBlur,
            "+" => Self::MoreWorkers,
            "-" => Self::FewerWorkers,
            _ => return parse_with_argument(token),
        };
        Ok(cmd)
    }
}

fn parse_with_argument(token: &str) -> Result<Command, AppError> {
    let Some((name, arg)) = token.split_once(':') else {
        return Err(AppError::UnknownCommand(token.to_string()));
    };
    match name {
        "drag" => {
            let (a, b) = parse_points(name, arg)?;
            Ok(Command::Drag { a, b })
        }
        "center" => {
            let (center, edge) = parse_points(name, arg)?;
            Ok(Command::DragCentered { center, edge })
        }
        "size" => {
            let (width, height) = parse_size(arg).map_err(|reason| AppError::BadArgument {
                command: name.to_string(),
                reason,
            })?;
            Ok(Command::Resize { width, height })
        }
        _ => Err(AppError::UnknownCommand(token.to_string())),
    }
}

fn parse_points(command: &str, arg: &str) -> Result<(ScreenPoint, ScreenPoint), AppError> {
    let bad = |reason: String| AppError::BadArgument {
        command: command.to_string(),
        reason,
    };
    let coords = arg
        .split(',')
        .map(|s| s.trim().parse::<i32>().map_err(|e| bad(format!("`{s}`: {e}"))))
        .collect::<Result<Vec<_>, _>>()?;
    match coords[..] {
        [x0, y0, x1, y1] => Ok((ScreenPoint::new(x0, y0), ScreenPoint::new(x1, y1))),
        _ => Err(bad(format!("expected four coordinates, got {}", coords.len()))),
    }
}

/// Parse a `WIDTHxHEIGHT` resolution.
pub fn parse_size(arg: &str) -> Result<(u32, u32), String> {
    let (w, h) = arg
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{arg}`"))?;
    let width = w.trim().parse::<u32>().map_err(|e| format!("width `{w}`: {e}"))?;
    let height = h.trim().parse::<u32>().map_err(|e| format!("height `{h}`: {e}"))?;
    if width == 0 || height == 0 {
        return Err(format!("resolution must be non-zero, got {width}x{height}"));
    }
    Ok((width, height))
}

/// Parse a whole script. Stops at the first bad token.
pub fn parse_script(script: &str) -> Result<Vec<Command>, AppError> {
    script.split_whitespace().map(str::parse).collect()
}
