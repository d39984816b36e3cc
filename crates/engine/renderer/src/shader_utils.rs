//! Shared shader compilation utilities for OpenGL renderers

use glow::*;

use crate::error::{RenderError, Result};

fn stage_name(shader_type: u32) -> &'static str {
    match shader_type {
        VERTEX_SHADER => "vertex",
        FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    }
}

/// Compile a shader from source code
///
/// # Safety
/// Requires an active OpenGL context
pub unsafe fn compile_shader(gl: &Context, shader_type: u32, source: &str) -> Result<Shader> {
    unsafe {
        let shader = gl.create_shader(shader_type).map_err(RenderError::Gl)?;

        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(RenderError::ShaderCompile {
                stage: stage_name(shader_type),
                log,
            });
        }

        Ok(shader)
    }
}

/// Compile both stages, discarding the vertex stage if the fragment stage fails
fn compile_stages<S>(
    mut compile: impl FnMut(u32, &str) -> Result<S>,
    discard: impl FnOnce(S),
    vertex_src: &str,
    fragment_src: &str,
) -> Result<(S, S)> {
    let vertex = compile(VERTEX_SHADER, vertex_src)?;
    match compile(FRAGMENT_SHADER, fragment_src) {
        Ok(fragment) => Ok((vertex, fragment)),
        Err(e) => {
            discard(vertex);
            Err(e)
        }
    }
}

/// Create and link a shader program from vertex and fragment shader sources
///
/// Nothing is leaked on failure: stages are compiled before the program
/// object exists, and every object created so far is deleted on error.
///
/// # Safety
/// Requires an active OpenGL context
pub unsafe fn create_program(
    gl: &Context,
    label: &str,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<Program> {
    unsafe {
        let (vertex_shader, fragment_shader) = compile_stages(
            |stage, source| compile_shader(gl, stage, source),
            |shader| gl.delete_shader(shader),
            vertex_src,
            fragment_src,
        )?;

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(e) => {
                gl.delete_shader(vertex_shader);
                gl.delete_shader(fragment_shader);
                return Err(RenderError::Gl(e));
            }
        };

        gl.attach_shader(program, vertex_shader);
        gl.attach_shader(program, fragment_shader);
        gl.link_program(program);

        gl.detach_shader(program, vertex_shader);
        gl.detach_shader(program, fragment_shader);
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(RenderError::ProgramLink {
                label: label.to_string(),
                log,
            });
        }

        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn compile_error(stage: u32) -> RenderError {
        RenderError::ShaderCompile {
            stage: stage_name(stage),
            log: "0:1: syntax error".to_string(),
        }
    }

    #[test]
    fn test_failed_fragment_discards_vertex_stage() {
        let discarded = RefCell::new(Vec::new());
        let result = compile_stages(
            |stage, _| {
                if stage == FRAGMENT_SHADER {
                    Err(compile_error(stage))
                } else {
                    Ok(stage)
                }
            },
            |shader| discarded.borrow_mut().push(shader),
            "vertex",
            "fragment",
        );

        assert!(matches!(
            result,
            Err(RenderError::ShaderCompile { stage: "fragment", .. })
        ));
        assert_eq!(*discarded.borrow(), vec![VERTEX_SHADER]);
    }

    #[test]
    fn test_failed_vertex_stops_before_fragment() {
        let compiled = RefCell::new(Vec::new());
        let result = compile_stages(
            |stage, _| {
                compiled.borrow_mut().push(stage);
                Err::<u32, _>(compile_error(stage))
            },
            |_| panic!("nothing to discard"),
            "vertex",
            "fragment",
        );

        assert!(result.is_err());
        assert_eq!(*compiled.borrow(), vec![VERTEX_SHADER]);
    }

    #[test]
    fn test_both_stages_returned_in_order() {
        let result = compile_stages(|stage, _| Ok(stage), |_| {}, "v", "f").unwrap();
        assert_eq!(result, (VERTEX_SHADER, FRAGMENT_SHADER));
    }
}
