use crate::gl_helper;
use crate::gl_helper::{
    explode_if_gl_error, gl_offset_for, ArrayBufferType, Buffer, ElementArrayBufferType,
    GLBufferType, GLErrorWrapper, VertexArray,
};
use gl::types::{GLenum, GLint, GLsizei, GLuint};
use std::mem::size_of;

/// Stand-in for "there is a current GL context".  Bindings borrow it mutably so only one
/// vertex array is bound through these wrappers at a time.
pub struct GPUState {}

impl GPUState {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for GPUState {
    fn default() -> Self {
        Self::new()
    }
}

/// `(attribute location, components per vertex, offset in elements)`
pub type AttributeLayout = (GLuint, GLint, GLsizei);

/// # Arguments
/// * `program_attribute_location` - the `layout (location = N)` of the shader input
/// * `attribute_array_width` - would be 3 for a vec3 or 2 for a vec2
/// * `stride` - is how many `AT`s are in a row, because often data is packed with multiple attributes per row.  For example, XYZUV data would have stride 5 and probably two attributes with width 3 (for xyz) and 2 (for uv)
/// * `offset` - how many `AT`s are between the beginning of the "row" and this attribute's data.
fn rig_one_attribute<AT: GLBufferType>(
    program_attribute_location: GLuint,
    attribute_array_width: GLint,
    stride: GLsizei,
    offset: GLsizei,
) -> Result<(), GLErrorWrapper> {
    unsafe {
        gl::VertexAttribPointer(
            program_attribute_location,
            attribute_array_width,
            AT::TYPE_CODE,
            gl::FALSE,
            stride * size_of::<AT>() as GLsizei,
            gl_helper::gl_offset_for::<AT>(offset),
        );
    }
    explode_if_gl_error()?;

    unsafe { gl::EnableVertexAttribArray(program_attribute_location) };
    explode_if_gl_error()
}

fn unbind_everything() {
    // the vertex array has to go first, or it forgets its index buffer
    unsafe {
        gl::BindVertexArray(0);
        gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, 0);
        gl::BindBuffer(gl::ARRAY_BUFFER, 0);
    }
}

//

/// A vertex array with only a vertex buffer behind it, drawn with `glDrawArrays`.
pub struct BoundVertexArray<'a, AT> {
    pub gpu_state: &'a GPUState,
    pub vertex_array: &'a VertexArray,
    pub vertex_buffer: &'a Buffer<ArrayBufferType, AT>,
}

impl<'a, AT> BoundVertexArray<'a, AT> {
    fn new(
        gpu_state: &'a mut GPUState,
        vertex_array: &'a VertexArray,
        vertex_buffer: &'a Buffer<ArrayBufferType, AT>,
    ) -> Result<Self, GLErrorWrapper> {
        vertex_array.bind()?;
        vertex_buffer.bind()?;
        Ok(Self {
            gpu_state,
            vertex_array,
            vertex_buffer,
        })
    }

    pub fn draw_arrays(
        &self,
        mode: GLenum,
        first: GLint,
        count: GLsizei,
    ) -> Result<(), GLErrorWrapper> {
        unsafe { gl::DrawArrays(mode, first, count) };
        explode_if_gl_error()
    }
}

impl<'a, AT: GLBufferType> BoundVertexArray<'a, AT> {
    pub fn rig_one_attribute(
        &self,
        program_attribute_location: GLuint,
        attribute_array_width: GLint,
        stride: GLsizei,
        offset: GLsizei,
    ) -> Result<(), GLErrorWrapper> {
        rig_one_attribute::<AT>(
            program_attribute_location,
            attribute_array_width,
            stride,
            offset,
        )
    }
}

impl<'a, AT> Drop for BoundVertexArray<'a, AT> {
    fn drop(&mut self) {
        unbind_everything()
    }
}

//

/// A vertex array with a vertex buffer and an index buffer, drawn with `glDrawElements`.
pub struct BoundBuffers<'a, AT, IT> {
    pub gpu_state: &'a GPUState,
    pub vertex_array: &'a VertexArray,
    pub vertex_buffer: &'a Buffer<ArrayBufferType, AT>,
    pub index_buffer: &'a Buffer<ElementArrayBufferType, IT>,
}

impl<'a, AT, IT> BoundBuffers<'a, AT, IT> {
    fn new(
        gpu_state: &'a mut GPUState,
        vertex_array: &'a VertexArray,
        vertex_buffer: &'a Buffer<ArrayBufferType, AT>,
        index_buffer: &'a Buffer<ElementArrayBufferType, IT>,
    ) -> Result<Self, GLErrorWrapper> {
        vertex_array.bind()?;
        vertex_buffer.bind()?;
        index_buffer.bind()?;
        Ok(Self {
            gpu_state,
            vertex_array,
            vertex_buffer,
            index_buffer,
        })
    }
}

impl<'a, AT: GLBufferType, IT> BoundBuffers<'a, AT, IT> {
    pub fn rig_one_attribute(
        &self,
        program_attribute_location: GLuint,
        attribute_array_width: GLint,
        stride: GLsizei,
        offset: GLsizei,
    ) -> Result<(), GLErrorWrapper> {
        rig_one_attribute::<AT>(
            program_attribute_location,
            attribute_array_width,
            stride,
            offset,
        )
    }
}

impl<'a, AT, IT: GLBufferType> BoundBuffers<'a, AT, IT> {
    pub fn draw_elements(
        &self,
        mode: GLenum,
        n_indices: GLsizei,
        offset: GLsizei,
    ) -> Result<(), GLErrorWrapper> {
        let offset = unsafe { gl_offset_for::<IT>(offset) };
        unsafe {
            gl::DrawElements(mode, n_indices, IT::TYPE_CODE, offset);
        }
        explode_if_gl_error()
    }
}

impl<'a, AT, IT> Drop for BoundBuffers<'a, AT, IT> {
    fn drop(&mut self) {
        unbind_everything()
    }
}

//

/// Vertex array + vertex buffer, uploaded once.
pub struct VertexArrayBundle<AT> {
    pub vertex_array: VertexArray,
    pub vertex_buffer: Buffer<ArrayBufferType, AT>,
    /// in `AT`s per vertex
    pub stride: GLsizei,
}

impl<AT: GLBufferType> VertexArrayBundle<AT> {
    /// `stride` is in `AT`s per vertex; each attribute is `(location, width, offset)`
    pub fn new(
        gpu_state: &mut GPUState,
        vertices: &[AT],
        stride: GLsizei,
        attributes: &[AttributeLayout],
    ) -> Result<Self, GLErrorWrapper> {
        let vertex_array = VertexArray::new()?;
        let mut vertex_buffer = Buffer::new()?;

        vertex_array.bind()?;
        vertex_buffer.load(vertices)?;

        let rval = Self {
            vertex_array,
            vertex_buffer,
            stride,
        };

        {
            let binding = rval.bind(gpu_state)?;
            for &(location, width, offset) in attributes {
                binding.rig_one_attribute(location, width, stride, offset)?;
            }
        }

        Ok(rval)
    }

    /// how many whole vertices the buffer holds
    pub fn vertex_count(&self) -> usize {
        vertices_in(self.vertex_buffer.len(), self.stride)
    }

    pub fn bind<'a>(
        &'a self,
        gpu_state: &'a mut GPUState,
    ) -> Result<BoundVertexArray<'a, AT>, GLErrorWrapper> {
        BoundVertexArray::new(gpu_state, &self.vertex_array, &self.vertex_buffer)
    }
}

/// Vertex array + vertex buffer + index buffer, uploaded once.
pub struct VertexBufferBundle<AT, IT> {
    pub vertex_array: VertexArray,
    pub vertex_buffer: Buffer<ArrayBufferType, AT>,
    pub index_buffer: Buffer<ElementArrayBufferType, IT>,
}

impl<AT: GLBufferType, IT> VertexBufferBundle<AT, IT> {
    pub fn new(
        gpu_state: &mut GPUState,
        vertices: &[AT],
        indices: &[IT],
        stride: GLsizei,
        attributes: &[AttributeLayout],
    ) -> Result<Self, GLErrorWrapper> {
        let vertex_array = VertexArray::new()?;
        let mut vertex_buffer = Buffer::new()?;
        let mut index_buffer = Buffer::new()?;

        // the element array binding is recorded in the vertex array, so bind that first
        vertex_array.bind()?;
        vertex_buffer.load(vertices)?;
        index_buffer.load(indices)?;

        let rval = Self {
            vertex_array,
            vertex_buffer,
            index_buffer,
        };

        {
            let binding = rval.bind(gpu_state)?;
            for &(location, width, offset) in attributes {
                binding.rig_one_attribute(location, width, stride, offset)?;
            }
        }

        Ok(rval)
    }

    pub fn index_count(&self) -> usize {
        self.index_buffer.len()
    }

    pub fn bind<'a>(
        &'a self,
        gpu_state: &'a mut GPUState,
    ) -> Result<BoundBuffers<'a, AT, IT>, GLErrorWrapper> {
        BoundBuffers::new(
            gpu_state,
            &self.vertex_array,
            &self.vertex_buffer,
            &self.index_buffer,
        )
    }
}

/// A trailing partial vertex is not counted.
fn vertices_in(element_count: usize, stride: GLsizei) -> usize {
    match usize::try_from(stride) {
        Ok(stride) if stride > 0 => element_count / stride,
        _ => 0,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn vertex_count_follows_stride() {
        assert_eq!(vertices_in(9, 3), 3);
        assert_eq!(vertices_in(12, 3), 4);
        assert_eq!(vertices_in(10, 5), 2);
        assert_eq!(vertices_in(11, 3), 3);
    }

    #[test]
    fn degenerate_stride_counts_nothing() {
        assert_eq!(vertices_in(9, 0), 0);
        assert_eq!(vertices_in(9, -3), 0);
    }
}
