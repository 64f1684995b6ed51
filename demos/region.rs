//! Applies boolean operation to a pair of built-in shapes and prints the outline
#![deny(warnings)]

use shape_region::*;
use std::{env, io::Write};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    op: RegionOp,
    angle: Scalar,
    fill_rule: FillRule,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut result = Args {
            op: RegionOp::Union,
            angle: 0.0,
            fill_rule: FillRule::NonZero,
        };
        let mut positional = 0;
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "region".to_owned());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" => {
                    positional = 0;
                    break;
                }
                "-r" => {
                    let degrees: Scalar = args.next().ok_or("-r requires argument")?.parse()?;
                    result.angle = degrees.to_radians();
                }
                "-e" => {
                    result.fill_rule = FillRule::EvenOdd;
                }
                _ => {
                    positional += 1;
                    match positional {
                        1 => result.op = parse_op(&arg)?,
                        _ => return Err("unexpected positional argument".into()),
                    }
                }
            }
        }
        if positional < 1 {
            eprintln!("Applies boolean operation to a frame and a rotated flower");
            eprintln!("\nUSAGE:");
            eprintln!("    {} [-r <degrees>] [-e] <op>", cmd);
            eprintln!("\nARGS:");
            eprintln!("    -r <degrees>       rotate the flower around its center");
            eprintln!("    -e                 use even-odd fill rule for the frame (default: non-zero)");
            eprintln!("    <op>               one of: union, intersection, subtracting, xor");
            std::process::exit(1);
        }
        Ok(result)
    }
}

fn parse_op(op: &str) -> Result<RegionOp, Error> {
    match op {
        "union" => Ok(RegionOp::Union),
        "intersection" => Ok(RegionOp::Intersection),
        "subtracting" => Ok(RegionOp::Subtracting),
        "xor" => Ok(RegionOp::SymmetricDifference),
        _ => Err(format!("unknown operation: {}", op).into()),
    }
}

/// Rounded frame with a square window, both contours are counter-clockwise
fn frame(fill_rule: FillRule) -> Region {
    let path = Path::builder()
        .move_to((0.0, 0.0))
        .rbox((10.0, 10.0), (2.0, 2.0))
        .move_to((3.0, 3.0))
        .line_to((7.0, 3.0))
        .line_to((7.0, 7.0))
        .line_to((3.0, 7.0))
        .close()
        .build();
    Region::from_path(&path, fill_rule)
}

/// Six circles around the center of the frame
fn flower(angle: Scalar) -> Region {
    let petals = (0..6).fold(Region::empty(), |region, index| {
        let phi = index as Scalar * PI / 3.0;
        region.union(&Region::circle((2.5 * phi.cos(), 2.5 * phi.sin()), 1.5))
    });
    let tr = Transform::new_rotate(angle);
    let petals = &petals * tr;
    petals * Transform::new_translate(5.0, 5.0)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;

    let left = frame(args.fill_rule);
    let right = flower(args.angle);
    tracing::debug!("[left:area] {}", left.area());
    tracing::debug!("[right:area] {}", right.area());

    let result = args.op.apply(&left, &right);
    tracing::debug!("[result:area] {}", result.area());

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", result)?;
    Ok(())
}
