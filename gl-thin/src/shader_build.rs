//! Compile two shader stages and link them into a program.
//!
//! The GL entry points involved sit behind [ShaderApi] so the build procedure can be
//! driven without a live context.  [GlCalls] is the real thing.

use crate::errors::{ShaderBuildError, ShaderDiagnostic, ShaderStage};
use gl::types::{GLchar, GLint, GLuint};

/// The shader and program calls `compile_and_link` needs, one method per GL call
/// (or per status/log query).
pub trait ShaderApi {
    /// `Link` is not a shader type; implementations return 0 for it.
    fn create_shader(&mut self, stage: ShaderStage) -> GLuint;
    /// `glShaderSource` followed by `glCompileShader`
    fn compile_shader(&mut self, shader: GLuint, source: &str);
    fn compile_status(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&mut self, shader: GLuint);

    fn create_program(&mut self) -> GLuint;
    fn attach_shader(&mut self, program: GLuint, shader: GLuint);
    fn link_program(&mut self, program: GLuint);
    fn link_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn delete_program(&mut self, program: GLuint);
}

/// Build a program from a vertex and a fragment stage.
///
/// Both stages are always compiled and the program is always linked, even after an
/// earlier failure, so every diagnostic the driver has to offer is collected.  Shader
/// objects are deleted before returning no matter what.  On failure the error still
/// carries the program handle; see [ShaderFailurePolicy::resolve].
pub fn compile_and_link<A: ShaderApi + ?Sized>(
    api: &mut A,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<GLuint, ShaderBuildError> {
    let mut diagnostics = Vec::new();

    let vertex_shader = compile_stage(api, ShaderStage::Vertex, vertex_source, &mut diagnostics);
    let fragment_shader =
        compile_stage(api, ShaderStage::Fragment, fragment_source, &mut diagnostics);

    let program = api.create_program();
    api.attach_shader(program, vertex_shader);
    api.attach_shader(program, fragment_shader);
    api.link_program(program);

    if !api.link_status(program) {
        let log = api.program_info_log(program);
        diagnostics.push(diagnostic_or_placeholder(ShaderStage::Link, log));
    }

    // the program keeps what it needs once linked
    api.delete_shader(vertex_shader);
    api.delete_shader(fragment_shader);

    if diagnostics.is_empty() {
        Ok(program)
    } else {
        Err(ShaderBuildError {
            diagnostics,
            program,
        })
    }
}

fn compile_stage<A: ShaderApi + ?Sized>(
    api: &mut A,
    stage: ShaderStage,
    source: &str,
    diagnostics: &mut Vec<ShaderDiagnostic>,
) -> GLuint {
    let shader = api.create_shader(stage);
    api.compile_shader(shader, source);
    if !api.compile_status(shader) {
        let log = api.shader_info_log(shader);
        diagnostics.push(diagnostic_or_placeholder(stage, log));
    }
    shader
}

fn diagnostic_or_placeholder(stage: ShaderStage, log: String) -> ShaderDiagnostic {
    let trimmed = log.trim_end();
    if trimmed.is_empty() {
        ShaderDiagnostic::new(stage, format!("{} failed and the driver gave no log", stage))
    } else {
        ShaderDiagnostic::new(stage, trimmed)
    }
}

//

/// What to do with a program that failed to compile or link.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ShaderFailurePolicy {
    /// Log every diagnostic and hand back the broken program anyway.  Drawing with it
    /// produces nothing meaningful, but the render loop still runs.
    #[default]
    LogAndContinue,
    /// Log every diagnostic, delete the program and report the failure.
    Abort,
}

impl ShaderFailurePolicy {
    pub fn resolve<A: ShaderApi + ?Sized>(
        self,
        api: &mut A,
        built: Result<GLuint, ShaderBuildError>,
    ) -> Result<GLuint, ShaderBuildError> {
        let err = match built {
            Ok(program) => return Ok(program),
            Err(err) => err,
        };

        for diagnostic in &err.diagnostics {
            log::error!("{}", diagnostic);
        }

        match self {
            ShaderFailurePolicy::LogAndContinue => {
                log::warn!(
                    "continuing with program {} even though it did not build",
                    err.program
                );
                Ok(err.program)
            }
            ShaderFailurePolicy::Abort => {
                api.delete_program(err.program);
                Err(err)
            }
        }
    }
}

//

/// [ShaderApi] straight onto the loaded `gl` function pointers.
/// Needs a current context.
pub struct GlCalls;

impl ShaderApi for GlCalls {
    fn create_shader(&mut self, stage: ShaderStage) -> GLuint {
        match stage.gl_enum() {
            Some(kind) => unsafe { gl::CreateShader(kind) },
            None => 0,
        }
    }

    fn compile_shader(&mut self, shader: GLuint, source: &str) {
        let strings = [source.as_ptr() as *const GLchar];
        let lengths = [source.len() as GLint];
        unsafe {
            gl::ShaderSource(shader, 1, strings.as_ptr(), lengths.as_ptr());
            gl::CompileShader(shader);
        }
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        let mut is_compiled = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut is_compiled) };
        is_compiled != 0
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let mut max_length = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut max_length) };
        read_info_log(max_length, |capacity, written, buffer| unsafe {
            gl::GetShaderInfoLog(shader, capacity, written, buffer)
        })
    }

    fn delete_shader(&mut self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&mut self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&mut self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn link_status(&self, program: GLuint) -> bool {
        let mut link_status = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut link_status) };
        link_status != 0
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut max_length = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut max_length) };
        read_info_log(max_length, |capacity, written, buffer| unsafe {
            gl::GetProgramInfoLog(program, capacity, written, buffer)
        })
    }

    fn delete_program(&mut self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }
}

/// `max_length` is whatever `INFO_LOG_LENGTH` said, terminating NUL included.
fn read_info_log(
    max_length: GLint,
    fetch: impl FnOnce(GLint, *mut GLint, *mut GLchar),
) -> String {
    if max_length <= 0 {
        return String::new();
    }
    let mut error_log = vec![0u8; max_length as usize];
    let mut written: GLint = 0;
    fetch(max_length, &mut written, error_log.as_mut_ptr() as *mut GLchar);
    error_log.truncate(written.clamp(0, max_length) as usize);
    // some drivers leave the NUL inside the reported length
    while error_log.last() == Some(&0) {
        error_log.pop();
    }
    String::from_utf8_lossy(&error_log).into_owned()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    /// Pretends to be a driver.  Any source containing `BROKEN` fails to compile,
    /// and a program fails to link if any attached shader failed.
    #[derive(Default)]
    struct FakeDriver {
        next_handle: GLuint,
        live_shaders: BTreeMap<GLuint, (ShaderStage, bool)>,
        live_programs: BTreeSet<GLuint>,
        attached: BTreeMap<GLuint, Vec<GLuint>>,
        linked: BTreeMap<GLuint, bool>,
        deleted_shaders: Vec<GLuint>,
        log_override: Option<String>,
    }

    impl FakeDriver {
        fn fresh(&mut self) -> GLuint {
            self.next_handle += 1;
            self.next_handle
        }
    }

    impl ShaderApi for FakeDriver {
        fn create_shader(&mut self, stage: ShaderStage) -> GLuint {
            let handle = self.fresh();
            self.live_shaders.insert(handle, (stage, false));
            handle
        }

        fn compile_shader(&mut self, shader: GLuint, source: &str) {
            if let Some(entry) = self.live_shaders.get_mut(&shader) {
                entry.1 = !source.contains("BROKEN");
            }
        }

        fn compile_status(&self, shader: GLuint) -> bool {
            self.live_shaders
                .get(&shader)
                .map(|(_, ok)| *ok)
                .unwrap_or(false)
        }

        fn shader_info_log(&self, shader: GLuint) -> String {
            if let Some(log) = &self.log_override {
                return log.clone();
            }
            match self.live_shaders.get(&shader) {
                Some((stage, false)) => {
                    format!("0:1(1): error: syntax error in {} shader\n", stage)
                }
                _ => String::new(),
            }
        }

        fn delete_shader(&mut self, shader: GLuint) {
            self.live_shaders.remove(&shader);
            self.deleted_shaders.push(shader);
        }

        fn create_program(&mut self) -> GLuint {
            let handle = self.fresh();
            self.live_programs.insert(handle);
            handle
        }

        fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
            self.attached.entry(program).or_default().push(shader);
        }

        fn link_program(&mut self, program: GLuint) {
            let shaders = self.attached.get(&program).cloned().unwrap_or_default();
            let ok = shaders.len() == 2 && shaders.iter().all(|s| self.compile_status(*s));
            self.linked.insert(program, ok);
        }

        fn link_status(&self, program: GLuint) -> bool {
            self.linked.get(&program).copied().unwrap_or(false)
        }

        fn program_info_log(&self, program: GLuint) -> String {
            if self.link_status(program) {
                String::new()
            } else {
                "error: linking with uncompiled shader".to_string()
            }
        }

        fn delete_program(&mut self, program: GLuint) {
            self.live_programs.remove(&program);
        }
    }

    const GOOD_VERTEX: &str = "#version 330 core\nvoid main() {}";
    const GOOD_FRAGMENT: &str = "#version 330 core\nout vec4 c; void main() { c = vec4(1.0); }";
    const BAD_SOURCE: &str = "#version 330 core\nBROKEN main() {";

    #[test]
    fn good_sources_link_and_release_shaders() {
        let mut driver = FakeDriver::default();
        let program = compile_and_link(&mut driver, GOOD_VERTEX, GOOD_FRAGMENT).unwrap();

        assert!(driver.link_status(program));
        assert!(driver.live_programs.contains(&program));
        assert!(driver.live_shaders.is_empty());
        assert_eq!(driver.deleted_shaders.len(), 2);
    }

    #[test]
    fn broken_vertex_stage_is_reported_with_a_log() {
        let mut driver = FakeDriver::default();
        let err = compile_and_link(&mut driver, BAD_SOURCE, GOOD_FRAGMENT).unwrap_err();

        let stages: Vec<_> = err.failed_stages().collect();
        assert_eq!(stages, vec![ShaderStage::Vertex, ShaderStage::Link]);
        assert!(err.diagnostics.iter().all(|d| !d.message.is_empty()));
        assert!(err.diagnostics[0].message.contains("vertex"));
        assert!(driver.live_shaders.is_empty());
    }

    #[test]
    fn broken_fragment_stage_is_labelled_fragment() {
        let mut driver = FakeDriver::default();
        let err = compile_and_link(&mut driver, GOOD_VERTEX, BAD_SOURCE).unwrap_err();

        assert_eq!(err.diagnostics[0].stage, ShaderStage::Fragment);
        assert!(format!("{}", err.diagnostics[0])
            .starts_with("ERROR::SHADER::FRAGMENT::COMPILATION_FAILED\n"));
    }

    #[test]
    fn long_driver_logs_are_not_truncated() {
        let long_log = "x".repeat(2000);
        let mut driver = FakeDriver {
            log_override: Some(long_log.clone()),
            ..Default::default()
        };
        let err = compile_and_link(&mut driver, BAD_SOURCE, GOOD_FRAGMENT).unwrap_err();
        assert_eq!(err.diagnostics[0].message, long_log);
    }

    #[test]
    fn empty_driver_log_still_yields_a_message() {
        let mut driver = FakeDriver {
            log_override: Some(String::new()),
            ..Default::default()
        };
        let err = compile_and_link(&mut driver, BAD_SOURCE, GOOD_FRAGMENT).unwrap_err();
        assert_eq!(
            err.diagnostics[0].message,
            "vertex failed and the driver gave no log"
        );
    }

    #[test]
    fn log_and_continue_hands_back_the_broken_program() {
        let mut driver = FakeDriver::default();
        let built = compile_and_link(&mut driver, BAD_SOURCE, BAD_SOURCE);
        let program = ShaderFailurePolicy::LogAndContinue
            .resolve(&mut driver, built)
            .unwrap();

        assert!(!driver.link_status(program));
        assert!(driver.live_programs.contains(&program));
    }

    #[test]
    fn abort_deletes_the_broken_program() {
        let mut driver = FakeDriver::default();
        let built = compile_and_link(&mut driver, GOOD_VERTEX, BAD_SOURCE);
        let err = ShaderFailurePolicy::Abort
            .resolve(&mut driver, built)
            .unwrap_err();

        assert!(driver.live_programs.is_empty());
        assert_eq!(err.diagnostics[0].stage, ShaderStage::Fragment);
    }

    #[test]
    fn repeated_builds_do_not_leak_shader_objects() {
        let mut driver = FakeDriver::default();
        for _ in 0..3 {
            let built = compile_and_link(&mut driver, GOOD_VERTEX, GOOD_FRAGMENT);
            let program = ShaderFailurePolicy::default()
                .resolve(&mut driver, built)
                .unwrap();
            driver.delete_program(program);
        }
        assert!(driver.live_shaders.is_empty());
        assert!(driver.live_programs.is_empty());
        assert_eq!(driver.deleted_shaders.len(), 6);
    }

    #[test]
    fn info_log_reader_drops_trailing_nul() {
        let text = read_info_log(6, |capacity, written, buffer| {
            assert_eq!(capacity, 6);
            let bytes = b"oops!\0";
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr() as *const GLchar, buffer, 6);
                *written = 6;
            }
        });
        assert_eq!(text, "oops!");
        assert_eq!(read_info_log(0, |_, _, _| unreachable!()), "");
    }
}
