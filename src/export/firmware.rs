//! Firmware program-fragment generator.
//!
//! Emits C source the controller sketch can include directly: motion
//! parameters, angle and direction tables, comments, loop constants, a
//! cascade step table and a loop-aware player function.

// Angles are normalized to [0, 360) before the cast
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as _;

use crate::constants::{CLOCKS_PER_SLAVE, DEFAULT_PROJECT_NAME, MAX_DELAY_MS, SLAVE_COUNT};
use crate::models::{CascadeMode, CellAddress, Direction, Keyframe, LoopRange};
use crate::services::KeyframeStore;

/// Longest comment excerpt placed in a `//` line.
const COMMENT_EXCERPT_CHARS: usize = 30;

/// Turns a project name into a C identifier.
///
/// Anything outside `[A-Za-z0-9_]` becomes `_`; a leading digit gets a `_`
/// prefix; an empty result falls back to the default project name.
#[must_use]
pub fn c_identifier(name: &str) -> String {
    let mut ident: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.is_empty() {
        return DEFAULT_PROJECT_NAME.to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Escapes text for a C string literal.
fn c_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Single-line excerpt of a comment for `//` annotations.
fn comment_excerpt(comment: &str, max_chars: usize) -> String {
    comment
        .chars()
        .take(max_chars)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

const fn direction_constant(direction: Direction) -> &'static str {
    match direction {
        Direction::Cw => "CLOCKWISE",
        Direction::Ccw => "COUNTER_CLOCKWISE",
    }
}

fn loop_constant(marker: Option<usize>) -> String {
    marker.map_or_else(|| "-1".to_string(), |index| index.to_string())
}

/// Generates the controller program fragment for a choreography.
pub struct FirmwareExporter<'a> {
    name: String,
    keyframes: &'a [Keyframe],
    loop_range: &'a LoopRange,
    generated_at: DateTime<Utc>,
}

impl<'a> FirmwareExporter<'a> {
    /// Creates an exporter; `name` is turned into a C identifier.
    #[must_use]
    pub fn new(name: &str, store: &'a KeyframeStore, loop_range: &'a LoopRange) -> Self {
        Self {
            name: c_identifier(name),
            keyframes: store.keyframes(),
            loop_range,
            generated_at: Utc::now(),
        }
    }

    /// Overrides the timestamp written in the header.
    #[must_use]
    pub fn with_timestamp(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Identifier prefix used for every generated symbol.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.name
    }

    /// Renders the full fragment.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();
        self.write_header(&mut output);
        self.write_params(&mut output);
        self.write_angles(&mut output);
        self.write_directions(&mut output);
        self.write_comments(&mut output);
        self.write_loop(&mut output);
        self.write_cascade(&mut output);
        self.write_apply_function(&mut output);
        self.write_player(&mut output);
        output
    }

    fn write_header(&self, output: &mut String) {
        let _ = writeln!(output, "// ClockClock24 Choreographie: {}", self.name);
        let _ = writeln!(
            output,
            "// Generated: {}",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        output.push_str("// Estimated transition time per keyframe (controller estimate):\n");
        let mut total: u64 = 0;
        for (idx, keyframe) in self.keyframes.iter().enumerate() {
            let estimate = keyframe.estimated_transition_ms();
            total += u64::from(estimate) + u64::from(keyframe.delay_ms.min(MAX_DELAY_MS));
            let _ = writeln!(
                output,
                "//   KF {}: {} ms at {} steps/s",
                idx + 1,
                estimate,
                keyframe.speed
            );
        }
        let _ = writeln!(output, "// Estimated single pass (with delays): {total} ms\n");
    }

    fn write_params(&self, output: &mut String) {
        let count = self.keyframes.len();
        output.push_str("// Motion parameters per keyframe\n");
        output.push_str("typedef struct {\n");
        output.push_str("    uint16_t speed;         // Motor speed (steps/sec)\n");
        output.push_str("    uint16_t accel;         // Acceleration (steps/sec²)\n");
        output.push_str("    uint16_t delayMs;       // Delay after keyframe (ms)\n");
        output.push_str(
            "    uint8_t cascadeMode;    // 0=none, 1=column, 2=row, 3=diagonal, 4=ripple, 5=ripple_in, 6=snake, 7=spiral\n",
        );
        output.push_str("    uint16_t cascadeDelayMs; // Delay between groups (ms)\n");
        output.push_str("} t_keyframe_params;\n\n");

        let _ = writeln!(
            output,
            "const t_keyframe_params {}_params[{count}] = {{",
            self.name
        );
        // delayMs and cascadeDelayMs are uint16_t on the controller
        for (idx, keyframe) in self.keyframes.iter().enumerate() {
            let _ = write!(
                output,
                "    {{ {}, {}, {}, {}, {} }}",
                keyframe.speed,
                keyframe.accel,
                keyframe.delay_ms.min(MAX_DELAY_MS),
                keyframe.cascade_mode.firmware_value(),
                keyframe.cascade_delay_ms.min(MAX_DELAY_MS)
            );
            if idx + 1 < count {
                output.push(',');
            }
            let _ = write!(output, " // KF {}", idx + 1);
            if !keyframe.comment.is_empty() {
                let _ = write!(
                    output,
                    ": {}",
                    comment_excerpt(&keyframe.comment, COMMENT_EXCERPT_CHARS)
                );
            }
            output.push('\n');
        }
        output.push_str("};\n\n");
    }

    fn write_angles(&self, output: &mut String) {
        let count = self.keyframes.len();
        output.push_str("// Keyframe angles (slave 0-7, clock 0-2, [angleH, angleM])\n");
        let _ = writeln!(
            output,
            "const uint16_t {}_keyframes[{count}][{SLAVE_COUNT}][{CLOCKS_PER_SLAVE}][2] = {{",
            self.name
        );
        for (idx, keyframe) in self.keyframes.iter().enumerate() {
            let _ = write!(output, "    // Keyframe {}", idx + 1);
            if !keyframe.comment.is_empty() {
                let _ = write!(output, ": {}", comment_excerpt(&keyframe.comment, usize::MAX));
            }
            output.push_str("\n    {\n");
            for (slave, column) in keyframe.clocks.iter().enumerate() {
                let cells: Vec<String> = column
                    .iter()
                    .map(|c| format!("{{{}, {}}}", whole_degrees(c.angle_h), whole_degrees(c.angle_m)))
                    .collect();
                let _ = write!(output, "        {{ {} }}", cells.join(", "));
                if slave + 1 < SLAVE_COUNT {
                    output.push(',');
                }
                let _ = writeln!(output, " // Slave {}", slave + 1);
            }
            output.push_str("    }");
            if idx + 1 < count {
                output.push(',');
            }
            output.push('\n');
        }
        output.push_str("};\n\n");
    }

    fn write_directions(&self, output: &mut String) {
        let count = self.keyframes.len();
        output.push_str("// Direction modes (CW=1, CCW=0) for transitions TO next keyframe\n");
        let _ = writeln!(
            output,
            "const uint8_t {}_directions[{count}][{SLAVE_COUNT}][{CLOCKS_PER_SLAVE}][2] = {{",
            self.name
        );
        for (idx, keyframe) in self.keyframes.iter().enumerate() {
            let next = if idx + 1 >= count { 1 } else { idx + 2 };
            let _ = writeln!(output, "    // Keyframe {} -> {next}", idx + 1);
            output.push_str("    {\n");
            for (slave, column) in keyframe.clocks.iter().enumerate() {
                let cells: Vec<String> = column
                    .iter()
                    .map(|c| {
                        format!(
                            "{{{}, {}}}",
                            direction_constant(c.dir_h),
                            direction_constant(c.dir_m)
                        )
                    })
                    .collect();
                let _ = write!(output, "        {{ {} }}", cells.join(", "));
                if slave + 1 < SLAVE_COUNT {
                    output.push(',');
                }
                output.push('\n');
            }
            output.push_str("    }");
            if idx + 1 < count {
                output.push(',');
            }
            output.push('\n');
        }
        output.push_str("};\n\n");
    }

    fn write_comments(&self, output: &mut String) {
        let count = self.keyframes.len();
        output.push_str("// Keyframe comments/instructions\n");
        let _ = writeln!(output, "const char* {}_comments[{count}] = {{", self.name);
        for (idx, keyframe) in self.keyframes.iter().enumerate() {
            let _ = write!(output, "    \"{}\"", c_string(&keyframe.comment));
            if idx + 1 < count {
                output.push(',');
            }
            output.push('\n');
        }
        output.push_str("};\n\n");
    }

    fn write_loop(&self, output: &mut String) {
        let name = &self.name;
        output.push_str("// Loop configuration\n");
        let _ = writeln!(
            output,
            "const int {name}_loop_start = {}; // -1 = no loop",
            loop_constant(self.loop_range.start())
        );
        let _ = writeln!(
            output,
            "const int {name}_loop_end = {};",
            loop_constant(self.loop_range.end())
        );
        let _ = writeln!(
            output,
            "const int {name}_loop_count = {}; // 0 = infinite\n",
            self.loop_range.count()
        );
    }

    fn write_cascade(&self, output: &mut String) {
        output.push_str("// Cascade modes\n");
        let members: Vec<String> = CascadeMode::ALL
            .iter()
            .map(|mode| {
                format!(
                    "CASCADE_{} = {}",
                    mode.as_str().to_ascii_uppercase(),
                    mode.firmware_value()
                )
            })
            .collect();
        let _ = writeln!(output, "enum CascadeMode {{ {} }};\n", members.join(", "));

        output.push_str("// Cascade start step per mode (mode, slave, clock); multiply by cascadeDelayMs\n");
        let _ = writeln!(
            output,
            "const uint8_t {}_cascade_steps[{}][{SLAVE_COUNT}][{CLOCKS_PER_SLAVE}] = {{",
            self.name,
            CascadeMode::ALL.len()
        );
        for (idx, mode) in CascadeMode::ALL.iter().enumerate() {
            let columns: Vec<String> = (0..SLAVE_COUNT)
                .map(|slave| {
                    let steps: Vec<String> = CellAddress::all()
                        .filter(|cell| cell.slave() == slave)
                        .map(|cell| mode.step(cell).to_string())
                        .collect();
                    format!("{{{}}}", steps.join(", "))
                })
                .collect();
            let _ = write!(output, "    {{ {} }}", columns.join(", "));
            if idx + 1 < CascadeMode::ALL.len() {
                output.push(',');
            }
            let _ = writeln!(output, " // {mode}");
        }
        output.push_str("};\n\n");
    }

    fn write_apply_function(&self, output: &mut String) {
        let name = &self.name;
        output.push_str("// Helper function to apply a keyframe with motion parameters\n");
        let _ = writeln!(output, "void apply_{name}_keyframe(int keyframe_index) {{");
        let _ = writeln!(
            output,
            "    const t_keyframe_params& params = {name}_params[keyframe_index];"
        );
        output.push_str("    \n");
        output.push_str("    // Apply motion settings to all motors\n");
        let _ = writeln!(output, "    for (int slave = 0; slave < {SLAVE_COUNT}; slave++) {{");
        let _ = writeln!(output, "        for (int clock = 0; clock < {CLOCKS_PER_SLAVE}; clock++) {{");
        let _ = writeln!(
            output,
            "            uint16_t angleH = {name}_keyframes[keyframe_index][slave][clock][0];"
        );
        let _ = writeln!(
            output,
            "            uint16_t angleM = {name}_keyframes[keyframe_index][slave][clock][1];"
        );
        let _ = writeln!(
            output,
            "            uint8_t dirH = {name}_directions[keyframe_index][slave][clock][0];"
        );
        let _ = writeln!(
            output,
            "            uint8_t dirM = {name}_directions[keyframe_index][slave][clock][1];"
        );
        output.push_str("            \n");
        output.push_str("            // Cascade delay for this cell\n");
        let _ = writeln!(
            output,
            "            uint16_t delay = {name}_cascade_steps[params.cascadeMode][slave][clock] * params.cascadeDelayMs;"
        );
        output.push_str("            \n");
        output.push_str("            // Apply to your clock system with speed, accel, and delay\n");
        output.push_str(
            "            // set_clock_position(slave, clock, angleH, angleM, dirH, dirM, params.speed, params.accel, delay);\n",
        );
        output.push_str("        }\n");
        output.push_str("    }\n");
        output.push_str("    \n");
        output.push_str("    // Wait for keyframe delay after all clocks reach position\n");
        output.push_str("    // delay(params.delayMs);\n");
        output.push_str("}\n\n");
    }

    fn write_player(&self, output: &mut String) {
        let name = &self.name;
        output.push_str("// Play choreography with loop support\n");
        let _ = writeln!(output, "void play_{name}_choreography() {{");
        output.push_str("    int current_kf = 0;\n");
        output.push_str("    int loop_iteration = 0;\n");
        let _ = writeln!(
            output,
            "    const int total_keyframes = {};",
            self.keyframes.len()
        );
        output.push_str("    \n");
        output.push_str("    while (true) {\n");
        let _ = writeln!(output, "        apply_{name}_keyframe(current_kf);");
        output.push_str("        // wait_for_transition(); // Implement your timing\n");
        output.push_str("        \n");
        output.push_str("        // Check for loop\n");
        let _ = writeln!(
            output,
            "        if ({name}_loop_start >= 0 && {name}_loop_end >= 0 &&"
        );
        let _ = writeln!(output, "            current_kf == {name}_loop_end) {{");
        output.push_str("            loop_iteration++;\n");
        let _ = writeln!(
            output,
            "            if ({name}_loop_count == 0 || loop_iteration < {name}_loop_count) {{"
        );
        let _ = writeln!(output, "                current_kf = {name}_loop_start;");
        output.push_str("                continue;\n");
        output.push_str("            }\n");
        output.push_str("            loop_iteration = 0;\n");
        output.push_str("        }\n");
        output.push_str("        \n");
        output.push_str("        current_kf++;\n");
        output.push_str("        if (current_kf >= total_keyframes) break; // or loop: current_kf = 0;\n");
        output.push_str("    }\n");
        output.push_str("}\n");
    }
}

/// Angle rounded to whole degrees, wrapped into [0, 360).
fn whole_degrees(angle: f64) -> u16 {
    (angle.round() as u16) % 360
}
