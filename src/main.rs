use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use monure::render::{self, FluidSynth, WorkFiles};
use monure::Score;

const USAGE: &str = "Usage: monure <input.mnr> [output.mid]
       monure --dump <input.mnr>
       monure --tuning <input.mnr> [output.txt]
       monure --render <input.mnr> <soundfont.sf2> <output.wav>";

fn usage() -> ! {
    eprintln!("{}", USAGE);
    process::exit(1);
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage();
    }

    let (mode, rest) = match args[1].as_str() {
        "--dump" | "--tuning" | "--render" => (args[1].as_str(), &args[2..]),
        flag if flag.starts_with("--") => usage(),
        _ => ("--midi", &args[1..]),
    };
    let Some(input_path) = rest.first() else {
        usage();
    };

    // Read input file
    let source = match fs::read_to_string(input_path) {
        Ok(content) => content,
        Err(e) => fail(format!("Error reading file '{}': {}", input_path, e)),
    };

    let score = match monure::parse(&source) {
        Ok(score) => score,
        Err(e) => fail(format!("Compilation error: {}", e)),
    };
    for diagnostic in &score.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    match mode {
        "--dump" => dump(&score),
        "--tuning" => tuning(&score, rest.get(1)),
        "--render" => match (rest.get(1), rest.get(2)) {
            (Some(soundfont), Some(output)) => render_audio(&score, soundfont, output),
            _ => usage(),
        },
        _ => midi(&score, input_path, rest.get(1)),
    }
}

fn dump(score: &Score) {
    print!("{}", score);
    match score.to_yaml() {
        Ok(yaml) => println!("\n{}", yaml),
        Err(e) => fail(format!("Error serializing score: {}", e)),
    }
}

fn midi(score: &Score, input_path: &str, output_path: Option<&String>) {
    let path = match output_path {
        Some(path) => PathBuf::from(path),
        None => Path::new(input_path).with_extension("mid"),
    };
    if let Err(e) = render::write_midi(score, &path) {
        fail(format!("Error writing to '{}': {}", path.display(), e));
    }
    eprintln!(
        "Wrote MIDI to {} ({} notes, {} patterns)",
        path.display(),
        score.note_count(),
        score.patterns.len()
    );
}

fn tuning(score: &Score, output_path: Option<&String>) {
    let script = render::tuning_script_for_score(score);
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &script) {
                fail(format!("Error writing to '{}': {}", path, e));
            }
            eprintln!("Wrote tuning script to {}", path);
        }
        None => {
            print!("{}", script);
        }
    }
}

fn render_audio(score: &Score, soundfont: &str, output: &str) {
    let output = Path::new(output);
    let work = match WorkFiles::create() {
        Ok(work) => work,
        Err(e) => fail(format!("Error creating working files: {}", e)),
    };

    let config = score.render_config();
    eprintln!(
        ">>> Rendering [n={} | A={:?}Hz]",
        config.tuning.steps, config.base_pitch
    );

    let result = render::render_audio(
        score,
        &FluidSynth::default(),
        Path::new(soundfont),
        &work.midi,
        &work.script,
        output,
    );
    // Removed before any exit below
    drop(work);

    match result {
        Ok(()) => eprintln!("Wrote audio to {}", output.display()),
        Err(e) => fail(format!("Render error: {}", e)),
    }
}
