//! Runtime behavior tests.
//!
//! Drives the public API end to end: source text in, pixels and error
//! strings out. `Load` targets are served from memory.

use std::io::{self, Read};

use dbn_lang::{Builtins, ErrorCode, MemoryOpener, Outcome, Rgba, Settings, evaluate, evaluate_str};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn run_with(src: &str, settings: &Settings) -> Outcome {
    evaluate_str(src, "test.dbn", settings)
}

fn run(src: &str) -> Outcome {
    let outcome = run_with(src, &Settings::default());
    assert!(outcome.is_clean(), "unexpected errors: {:#?}", outcome.errors);
    outcome
}

fn errors_with(src: &str, settings: &Settings) -> Vec<String> {
    run_with(src, settings).errors.iter().map(|e| e.to_string()).collect()
}

fn errors(src: &str) -> Vec<String> {
    errors_with(src, &Settings::default())
}

/// Pixel at language coordinates (origin bottom-left) of an unscaled canvas.
fn at(outcome: &Outcome, x: i64, y: i64) -> Rgba {
    let top = outcome.canvas.height() as i64 - 1;
    outcome.canvas.pixel(x, top - y)
}

fn uniform(outcome: &Outcome, color: Rgba) -> bool {
    outcome.canvas.pixels().iter().all(|p| *p == color)
}

fn files() -> MemoryOpener {
    MemoryOpener::new()
        .with("error.dbn", "Paper 5 Pen 1\n")
        .with("lib.dbn", "Command Dot X Y {\n  Set [X Y] 100\n}\n")
        .with("outer.dbn", "Load \"inner.dbn\"\nSet [2 2] 100\n")
        .with("inner.dbn", "Paper Missing\n")
}

// ─── Paper ───────────────────────────────────────────────────────────────────

#[test]
fn empty_program_is_white() {
    assert!(uniform(&run(""), Rgba::WHITE));
    assert!(uniform(&run("\n\n\n"), Rgba::WHITE));
}

#[test]
fn paper_levels() {
    assert!(uniform(&run("Paper 100"), Rgba::BLACK));
    assert!(uniform(&run("Paper 50"), Rgba::gray(127)));
    assert!(uniform(&run("Paper 0"), Rgba::WHITE));
}

#[test]
fn later_paper_overwrites() {
    assert!(uniform(&run("Paper 50\nPaper 10"), Rgba::gray(229)));
}

#[test]
fn paper_is_clamped() {
    assert!(uniform(&run("Paper 150"), Rgba::BLACK));
    assert!(uniform(&run("Paper (0 - 20)"), Rgba::WHITE));
}

#[test]
fn keywords_any_case() {
    assert!(uniform(&run("paper 100"), Rgba::BLACK));
    assert!(uniform(&run("PAPER 100"), Rgba::BLACK));
}

#[test]
fn arithmetic_precedence() {
    assert!(uniform(&run("Paper (20 / 2 + 20 * 2)"), Rgba::gray(127)));
    assert!(uniform(&run("Paper 100 - 25 - 25"), Rgba::gray(127)));
}

// ─── Lines and pixels ────────────────────────────────────────────────────────

#[test]
fn line_origin_is_bottom_left() {
    let out = run("Line 0 0 99 99");
    assert_eq!(at(&out, 0, 0), Rgba::BLACK);
    assert_eq!(at(&out, 50, 50), Rgba::BLACK);
    assert_eq!(at(&out, 99, 99), Rgba::BLACK);
    assert_eq!(at(&out, 0, 99), Rgba::WHITE);
    assert_eq!(out.canvas.pixel(0, 99), Rgba::BLACK);
}

#[test]
fn line_in_block_matches_bare_line() {
    let bare = run("Line 0 0 100 100");
    let wrapped = run("{\n  Line 0 0 100 100\n}");
    assert_eq!(bare.canvas, wrapped.canvas);
}

#[test]
fn pen_sets_line_color() {
    let out = run("Pen 50\nLine 0 10 99 10");
    assert_eq!(at(&out, 42, 10), Rgba::gray(127));
}

#[test]
fn set_and_read_pixel() {
    let out = run("Set [10 10] 100\nSet A [10 10]\nSet B [11 11]\nPaper A\nSet [0 0] B");
    assert!(at(&out, 50, 50) == Rgba::BLACK);
    assert_eq!(at(&out, 0, 0), Rgba::WHITE);
}

#[test]
fn read_outside_canvas_is_full_ink() {
    assert!(uniform(&run("Set A [500 500]\nPaper A"), Rgba::BLACK));
}

#[test]
fn write_outside_canvas_is_dropped() {
    assert!(uniform(&run("Set [(0 - 1) 0] 100\nSet [100 0] 100\nSet [0 100] 100"), Rgba::WHITE));
}

#[test]
fn far_off_canvas_line_stays_cheap() {
    let out = run("Line 0 0 2000000000 1\nLine 50 (0 - 2000000000) 51 2000000000");
    for x in 0..100 {
        assert_eq!(at(&out, x, 0), Rgba::BLACK, "column {x}");
    }
    assert_eq!(at(&out, 51, 50), Rgba::BLACK);
    assert_eq!(at(&out, 50, 50), Rgba::WHITE);
}

// ─── Repeat and conditionals ─────────────────────────────────────────────────

#[test]
fn repeat_upper_bound_is_inclusive() {
    let out = run("Repeat A 10 20 {\n  Line A 10 A 20\n}");
    for x in 10..=20 {
        assert_eq!(at(&out, x, 15), Rgba::BLACK, "column {x}");
    }
    assert_eq!(at(&out, 9, 15), Rgba::WHITE);
    assert_eq!(at(&out, 21, 15), Rgba::WHITE);
}

#[test]
fn repeat_rereads_its_bound() {
    let out = run("Set N 3\nSet C 0\nRepeat I 1 N {\n  Set N 5\n  Set C (C + 1)\n}\nPaper (C * 10)");
    assert!(uniform(&out, Rgba::gray(127)));
}

#[test]
fn repeat_variable_outlives_loop() {
    assert!(uniform(&run("Repeat I 1 7 { }\nPaper (I * 10)"), Rgba::gray(76)));
}

#[test]
fn empty_repeat_never_binds() {
    assert_eq!(errors("Repeat I 5 1 { }\nPaper I"), vec!["test.dbn:2:8: Identifier not found: I"]);
}

#[test]
fn conditionals() {
    assert!(uniform(&run("Same? 1 1 { Paper 100 }"), Rgba::BLACK));
    assert!(uniform(&run("Same? 1 2 { Paper 100 }"), Rgba::WHITE));
    assert!(uniform(&run("NotSame? 1 2 { Paper 100 }"), Rgba::BLACK));
    assert!(uniform(&run("Smaller? 1 2 { Paper 100 }"), Rgba::BLACK));
    assert!(uniform(&run("Smaller? 2 2 { Paper 100 }"), Rgba::WHITE));
    assert!(uniform(&run("NotSmaller? 2 2 { Paper 100 }"), Rgba::BLACK));
}

// ─── Commands ────────────────────────────────────────────────────────────────

#[test]
fn command_call_binds_parameters() {
    assert!(uniform(&run("Command Shade A { Paper A }\nShade 50"), Rgba::gray(127)));
}

#[test]
fn command_sees_call_site_bindings() {
    let src = "\
Command Draw {
  Paper Shade
}
Set Shade 10
Command Wrapper {
  Set Shade 50
  Draw
}
Wrapper";
    assert!(uniform(&run(src), Rgba::gray(127)));
}

#[test]
fn command_frame_is_discarded() {
    let src = "Set A 10\nCommand Local {\n  Set A 100\n}\nLocal\nPaper A";
    assert!(uniform(&run(src), Rgba::gray(229)));
}

#[test]
fn surplus_arguments_dropped() {
    assert!(uniform(&run("Command One A { Paper A }\nOne 50 60"), Rgba::gray(127)));
}

#[test]
fn missing_argument_leaves_parameter_unbound() {
    assert_eq!(
        errors("Command Two A B { Paper B }\nTwo 50"),
        vec!["test.dbn:1:26: Identifier not found: B"],
    );
}

#[test]
fn value_outside_number_is_ignored() {
    assert!(uniform(&run("Value 5\nPaper 100"), Rgba::BLACK));
    assert!(uniform(&run("Command C {\n  Value 5\n  Paper 100\n}\nC"), Rgba::BLACK));
}

// ─── Numbers ─────────────────────────────────────────────────────────────────

#[test]
fn number_call_runs_side_effects_before_value() {
    assert!(uniform(&run("Number Test A {\n  Set B (A + 25)\n  Value B\n}\nPaper <Test 25>"), Rgba::gray(127)));
}

#[test]
fn number_body_can_draw() {
    assert!(uniform(&run("Number Dark {\n  Paper 100\n  Value 0\n}\nSet X <Dark>"), Rgba::BLACK));
}

#[test]
fn value_stops_the_body() {
    assert!(uniform(&run("Number N {\n  Value 10\n  Paper 100\n}\nPaper <N>"), Rgba::gray(229)));
}

#[test]
fn value_returns_from_nested_blocks() {
    let src = "Number Sign A {\n  Smaller? A 0 { Value 0 }\n  Value 100\n}\nPaper <Sign (0 - 5)>";
    assert!(uniform(&run(src), Rgba::WHITE));

    let src = "Number First {\n  Repeat I 1 100 {\n    Same? I 3 { Value I }\n  }\n}\nPaper <First>";
    assert!(uniform(&run(src), Rgba::gray(247)));
}

#[test]
fn number_without_value_is_zero() {
    assert!(uniform(&run("Paper 100\nNumber Nothing { }\nPaper <Nothing>"), Rgba::WHITE));
}

#[test]
fn recursive_number() {
    let src = "\
Number Fact N {
  Smaller? N 2 { Value 1 }
  Value (N * <Fact (N - 1)>)
}
Paper (<Fact 4> + 26)";
    assert!(uniform(&run(src), Rgba::gray(127)));
}

#[test]
fn value_inside_command_called_from_number() {
    let src = "\
Command Noise {
  Value 90
}
Number Ten {
  Noise
  Value 10
}
Paper <Ten>";
    assert!(uniform(&run(src), Rgba::gray(229)));
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn syntax_error_runs_nothing() {
    let out = run_with("Paper 100 Paper 100\n", &Settings::default());
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].to_string(), "test.dbn:1:11: syntax error");
    assert_eq!(out.errors[0].code(), ErrorCode::P001);
    assert!(uniform(&out, Rgba::TRANSPARENT));
    assert!(!out.is_clean());
}

#[test]
fn identifier_not_found() {
    let out = run_with("Paper X\n", &Settings::default());
    assert_eq!(out.errors[0].to_string(), "test.dbn:1:8: Identifier not found: X");
    assert_eq!(out.errors[0].code(), ErrorCode::E001);
    assert!(uniform(&out, Rgba::WHITE));
}

#[test]
fn command_not_found() {
    assert_eq!(errors("Func X\n"), vec!["test.dbn:1:5: Command not found: Func"]);
}

#[test]
fn number_not_found() {
    assert_eq!(errors("Paper <Test>"), vec!["test.dbn:1:12: Number not found: Test"]);
}

#[test]
fn wrong_kind_is_not_found() {
    assert_eq!(errors("Set Draw 5\nDraw"), vec!["test.dbn:2:5: Command not found: Draw"]);
    assert_eq!(errors("Command C { }\nPaper C"), vec!["test.dbn:2:8: Identifier not found: C"]);
    assert_eq!(errors("Set N 1\nPaper <N>"), vec!["test.dbn:2:9: Number not found: N"]);
}

#[test]
fn division_by_zero_is_reported() {
    let out = run_with("Paper (10 / 0)", &Settings::default());
    assert_eq!(out.errors[0].to_string(), "test.dbn:1:12: Division by zero");
    assert_eq!(out.errors[0].code(), ErrorCode::E004);
    assert!(uniform(&out, Rgba::WHITE));
}

#[test]
fn errors_keep_program_running() {
    let out = run_with("Paper X\nNope\nSet [0 0] 100", &Settings::default());
    assert_eq!(out.errors.len(), 2);
    assert_eq!(at(&out, 0, 0), Rgba::BLACK);
}

#[test]
fn unreadable_source() {
    struct Broken;
    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device gone"))
        }
    }
    let out = evaluate(Broken, "test.dbn", &Settings::default());
    assert_eq!(out.errors[0].to_string(), "test.dbn: device gone");
    assert_eq!(out.errors[0].code(), ErrorCode::I002);
    assert!(out.errors[0].position().is_none());
}

#[test]
fn evaluate_reads_bytes() {
    let out = evaluate("Paper 100\n".as_bytes(), "test.dbn", &Settings::default());
    assert!(out.is_clean());
    assert!(uniform(&out, Rgba::BLACK));
}

// ─── Load ────────────────────────────────────────────────────────────────────

#[test]
fn load_defines_into_current_frame() {
    let settings = Settings::default().with_opener(files());
    let out = run_with("Load \"lib.dbn\"\nDot 5 5", &settings);
    assert!(out.is_clean(), "{:?}", out.errors);
    assert_eq!(at(&out, 5, 5), Rgba::BLACK);
}

#[test]
fn load_syntax_error_is_isolated() {
    let settings = Settings::default().with_opener(files());
    let out = run_with("Paper 50\nLoad \"error.dbn\"\nSet [0 0] 100", &settings);
    let messages: Vec<String> = out.errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec!["error.dbn:1:9: syntax error"]);
    assert_eq!(at(&out, 50, 50), Rgba::gray(127));
    assert_eq!(at(&out, 0, 0), Rgba::BLACK);
}

#[test]
fn load_missing_file() {
    let settings = Settings::default().with_opener(files());
    let out = run_with("Load \"notfound.dbn\"\n", &settings);
    assert_eq!(out.errors[0].to_string(), "test.dbn:1:20: open notfound.dbn: file does not exist");
    assert_eq!(out.errors[0].code(), ErrorCode::I001);
}

#[test]
fn nested_load_errors_name_their_file() {
    let settings = Settings::default().with_opener(files());
    let out = run_with("Load \"outer.dbn\"", &settings);
    let messages: Vec<String> = out.errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec!["inner.dbn:1:14: Identifier not found: Missing"]);
    assert_eq!(at(&out, 2, 2), Rgba::BLACK);
}

#[test]
fn default_opener_finds_nothing() {
    assert_eq!(
        errors("Load \"lib.dbn\""),
        vec!["test.dbn:1:15: open lib.dbn: file does not exist"],
    );
}

// ─── Built-ins ───────────────────────────────────────────────────────────────

#[test]
fn letters_available() {
    let out = run("letterL 0 0");
    assert_eq!(at(&out, 0, 0), Rgba::BLACK);
    assert_eq!(at(&out, 0, 8), Rgba::BLACK);
    assert_eq!(at(&out, 4, 0), Rgba::BLACK);
    assert_eq!(at(&out, 4, 8), Rgba::WHITE);
}

#[test]
fn number_helpers() {
    for src in ["Paper <Max 20 50>", "Paper <Min 50 80>", "Paper <Abs (0 - 50)>", "Paper <Clamp 500 0 50>"] {
        assert!(uniform(&run(src), Rgba::gray(127)), "{src}");
    }
}

#[test]
fn shape_helpers() {
    let out = run("Rect 10 10 20 20");
    assert_eq!(at(&out, 10, 15), Rgba::BLACK);
    assert_eq!(at(&out, 15, 15), Rgba::WHITE);

    let out = run("FillRect 10 20 20 10");
    assert_eq!(at(&out, 15, 15), Rgba::BLACK);
    assert_eq!(at(&out, 15, 21), Rgba::WHITE);

    let out = run("Square 10 10 5");
    assert_eq!(at(&out, 15, 12), Rgba::BLACK);

    let out = run("Cross 50 50 3");
    assert_eq!(at(&out, 47, 50), Rgba::BLACK);
    assert_eq!(at(&out, 50, 53), Rgba::BLACK);
    assert_eq!(at(&out, 51, 51), Rgba::WHITE);
}

#[test]
fn builtins_can_be_disabled() {
    let settings = Settings::default().with_builtins(Builtins::none());
    assert_eq!(errors_with("letterA 0 0", &settings), vec!["test.dbn:1:8: Command not found: letterA"]);
}

#[test]
fn broken_builtin_is_reported() {
    let settings = Settings::default().with_builtins(Builtins::none().with("broken.dbn", "Paper 1 2"));
    let out = run_with("Paper 100", &settings);
    let messages: Vec<String> = out.errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages, vec!["broken.dbn:1:9: syntax error"]);
    assert!(uniform(&out, Rgba::BLACK));
}

// ─── Frames and scaling ──────────────────────────────────────────────────────

#[test]
fn no_frames_unless_requested() {
    assert!(run("Paper 50").frames.is_empty());
}

#[test]
fn frames_follow_drawing_statements() {
    let settings = Settings::default().with_frames(0);
    let out = run_with("Paper 50\nPen 0\nLine 0 0 10 10\nSet [1 1] 0\nSet A 3", &settings);
    assert!(out.is_clean());
    assert_eq!(out.frames.len(), 4);
    assert_eq!(out.frames[0].palette, vec![Rgba::WHITE]);
    assert_eq!(out.frames[1].palette, vec![Rgba::gray(127)]);
    assert!(out.frames.iter().all(|f| f.delay == 0));
    assert_eq!(out.frames[3].to_canvas(), out.canvas);
}

#[test]
fn frame_cap() {
    let settings = Settings::default().with_frames(2);
    let out = run_with("Repeat I 0 50 {\n  Set [I I] 100\n}", &settings);
    assert_eq!(out.frames.len(), 2);
}

#[test]
fn scaling_is_output_only() {
    let settings = Settings::default().with_scale(3).with_frames(0);
    let out = run_with("Set [0 0] 100", &settings);
    assert_eq!((out.canvas.width(), out.canvas.height()), (300, 300));
    assert_eq!(out.canvas.pixel(0, 299), Rgba::BLACK);
    assert_eq!(out.canvas.pixel(2, 297), Rgba::BLACK);
    assert_eq!(out.canvas.pixel(3, 299), Rgba::WHITE);
    assert_eq!(out.frames[0].width, 300);
}

#[test]
fn blank_canvas_is_scaled_too() {
    let settings = Settings::default().with_scale(2);
    let out = run_with("Paper (", &settings);
    assert_eq!(out.canvas.width(), 200);
    assert!(uniform(&out, Rgba::TRANSPARENT));
}

#[test]
fn custom_length() {
    let out = run_with("Line 0 0 9 9", &Settings::default().with_length(10));
    assert_eq!(out.canvas.width(), 10);
    assert_eq!(at(&out, 9, 9), Rgba::BLACK);
}
