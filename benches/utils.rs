use sounding_thermo::{parse_raob_json, AnalysisConfig, SoundingProfile};
use std::{fs::File, io::Read, path::PathBuf};

pub fn load_all_test_files() -> [SoundingProfile; 3] {
    let snd1 = load_test_file("unstable.json");
    let snd2 = load_test_file("capped.json");
    let snd3 = load_test_file("near_saturated_isothermal.json");

    [snd1, snd2, snd3]
}

fn load_test_file(fname: &str) -> SoundingProfile {
    let mut test_path = PathBuf::new();
    test_path.push("tests");
    test_path.push("data");
    test_path.push(fname);

    let mut f = File::open(&test_path)
        .unwrap_or_else(|_| panic!("Error opening file: {:#?}", test_path));

    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .unwrap_or_else(|_| panic!("Error reading file: {:#?}", test_path));

    let raw = parse_raob_json(&contents)
        .expect("valid raob json")
        .expect("at least one profile");

    SoundingProfile::from_raw_sounding(&raw, &AnalysisConfig::default()).expect("valid profile")
}
