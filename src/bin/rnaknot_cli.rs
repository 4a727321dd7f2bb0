use std::fs;
use std::path::Path;
use std::process;

use rnaknot_engine::{
    BasePair, EvalParams, PolylineMode, ResidueCoord, SurfaceMode, Vec3, detect_entanglement,
    parse::{format_bpseq, pairs_from_map, parse_bpseq, parse_secstruct, read_secstruct_str},
};

const USAGE: &str = r#"rnaknot_cli (rnaknot-engine)

USAGE:
  rnaknot_cli convert <secstruct-file> [-o <out.bpseq>]
  rnaknot_cli eval <coords-file> <ss-file> [options]

The coords file is a whitespace table, one residue per line:
  <res_index> <px> <py> <pz> <c4x> <c4y> <c4z>
or, with only C4' atoms:
  <res_index> <c4x> <c4y> <c4z>
`nan` marks a missing coordinate; `#` starts a comment line.

The ss-file is BPSEQ when its extension is .bpseq, a dot-bracket
secstruct document otherwise.

OPTIONS (eval):
  --surface-mode <0|1>    0 = best-fit plane, 1 = triangulated (default 1)
  --polyline-mode <0|1>   0 = C4' only, 1 = P/C4' alternating (default 1)
  --keep-all-layers       skip the main-layer reduction
  --eps-plane <x>         plane tolerance (default 1e-2)
  --eps-polygon <x>       polygon tolerance (default 1e-2)
  --eps-collinear <x>     collinearity tolerance (default 1e-6)
"#;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("rnaknot_cli error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("convert") => run_convert(&args[1..]),
        Some("eval") => run_eval(&args[1..]),
        Some("help" | "--help" | "-h") | None => {
            print!("{USAGE}");
            Ok(())
        }
        Some(other) => Err(format!("unknown command '{other}'; try `rnaknot_cli help`").into()),
    }
}

fn run_convert(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = None;
    let mut output = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                output = Some(
                    iter.next()
                        .ok_or("missing value for -o")?
                        .clone(),
                );
            }
            _ if !arg.starts_with('-') && input.is_none() => input = Some(arg.clone()),
            other => return Err(format!("unexpected argument '{other}'").into()),
        }
    }

    let input = input.ok_or("convert: missing <secstruct-file>")?;
    let text = fs::read_to_string(&input)?;
    let (sequence, structure) = read_secstruct_str(&text)?;
    let map = parse_secstruct(&structure)?;
    let bpseq = format_bpseq(&sequence, &map);

    match output {
        Some(path) => fs::write(path, bpseq)?,
        None => print!("{bpseq}"),
    }
    Ok(())
}

fn run_eval(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let mut positional = Vec::new();
    let mut params = EvalParams::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--surface-mode" => {
                params.surface_mode = SurfaceMode::try_from(flag_value::<i32, _>(&mut iter, arg)?)?;
            }
            "--polyline-mode" => {
                params.polyline_mode =
                    PolylineMode::try_from(flag_value::<i32, _>(&mut iter, arg)?)?;
            }
            "--keep-all-layers" => params.main_layer_only = false,
            "--eps-plane" => params.eps_plane = flag_value(&mut iter, arg)?,
            "--eps-polygon" => params.eps_polygon = flag_value(&mut iter, arg)?,
            "--eps-collinear" => params.eps_collinear = flag_value(&mut iter, arg)?,
            _ if !arg.starts_with('-') => positional.push(arg.clone()),
            other => return Err(format!("unexpected argument '{other}'").into()),
        }
    }

    let [coords_path, ss_path] = positional.as_slice() else {
        return Err("eval: expected <coords-file> and <ss-file>".into());
    };

    let coords = read_coords_table(&fs::read_to_string(coords_path)?)?;
    let pairs = read_pairs(ss_path)?;

    let detection = detect_entanglement(&coords, &pairs, &params)?;

    println!("K = {}", detection.result.k);
    for hit in &detection.result.hits {
        let Some(loop_) = detection.loops.iter().find(|l| l.id == hit.loop_id) else {
            continue;
        };
        let closing: Vec<(u32, u32)> =
            loop_.closing_pairs.iter().map(|p| (p.i, p.j)).collect();
        let p = hit.point;
        println!(
            "hit loop={} type={} pairs={:?} segment=({}:{},{}:{}) point=({:.3},{:.3},{:.3})",
            hit.loop_id,
            loop_.kind,
            closing,
            hit.res_a,
            hit.atom_a,
            hit.res_b,
            hit.atom_b,
            p.x,
            p.y,
            p.z,
        );
    }
    Ok(())
}

fn flag_value<'a, T, I>(iter: &mut I, flag: &str) -> Result<T, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    I: Iterator<Item = &'a String>,
{
    let raw = iter
        .next()
        .ok_or_else(|| format!("missing value for {flag}"))?;
    raw.parse()
        .map_err(|err| format!("invalid value '{raw}' for {flag}: {err}").into())
}

fn read_pairs(path: &str) -> Result<Vec<BasePair>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let is_bpseq = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bpseq"));
    if is_bpseq {
        Ok(parse_bpseq(&text)?)
    } else {
        let (_, structure) = read_secstruct_str(&text)?;
        let map = parse_secstruct(&structure)?;
        Ok(pairs_from_map(&map))
    }
}

fn read_coords_table(text: &str) -> Result<Vec<ResidueCoord>, Box<dyn std::error::Error>> {
    let mut coords = Vec::new();
    for (line_no, raw) in (1..).zip(text.lines()) {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let parse_vec = |chunk: &[&str]| -> Result<Vec3, Box<dyn std::error::Error>> {
            let component = |s: &str| {
                s.parse::<f64>()
                    .map_err(|_| format!("line {line_no}: '{s}' is not a coordinate"))
            };
            Ok(Vec3::new(
                component(chunk[0])?,
                component(chunk[1])?,
                component(chunk[2])?,
            ))
        };
        let residue = match fields.as_slice() {
            [res, rest @ ..] if rest.len() == 6 => {
                let res_index = res.parse()?;
                ResidueCoord::new(res_index, parse_vec(&rest[..3])?, parse_vec(&rest[3..])?)
            }
            [res, rest @ ..] if rest.len() == 3 => {
                let res_index = res.parse()?;
                ResidueCoord::c4_only(res_index, parse_vec(rest)?)
            }
            _ => {
                return Err(format!(
                    "line {line_no}: expected 4 or 7 fields, got {}",
                    fields.len()
                )
                .into());
            }
        };
        coords.push(residue);
    }
    Ok(coords)
}
