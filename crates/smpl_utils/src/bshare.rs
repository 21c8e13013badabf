//! Moving arrays between host ndarray storage and burn tensors.
use burn::tensor::{backend::Backend, Tensor, TensorData};
use ndarray as nd;

/// Upload a host array as a float tensor of the same rank.
pub trait ToBurn<B: Backend, const D: usize> {
    fn to_burn(&self, device: &B::Device) -> Tensor<B, D>;
}

fn array_to_tensor<B: Backend, const D: usize, S, Dim>(arr: &nd::ArrayBase<S, Dim>, device: &B::Device) -> Tensor<B, D>
where
    S: nd::Data<Elem = f32>,
    Dim: nd::Dimension,
{
    // iter() walks in logical row-major order regardless of the memory layout
    let values: Vec<f32> = arr.iter().copied().collect();
    Tensor::from_data(TensorData::new(values, arr.shape().to_vec()), device)
}

impl<B: Backend, S: nd::Data<Elem = f32>> ToBurn<B, 1> for nd::ArrayBase<S, nd::Ix1> {
    fn to_burn(&self, device: &B::Device) -> Tensor<B, 1> {
        array_to_tensor(self, device)
    }
}
impl<B: Backend, S: nd::Data<Elem = f32>> ToBurn<B, 2> for nd::ArrayBase<S, nd::Ix2> {
    fn to_burn(&self, device: &B::Device) -> Tensor<B, 2> {
        array_to_tensor(self, device)
    }
}
impl<B: Backend, S: nd::Data<Elem = f32>> ToBurn<B, 3> for nd::ArrayBase<S, nd::Ix3> {
    fn to_burn(&self, device: &B::Device) -> Tensor<B, 3> {
        array_to_tensor(self, device)
    }
}
impl<B: Backend, S: nd::Data<Elem = f32>> ToBurn<B, 4> for nd::ArrayBase<S, nd::Ix4> {
    fn to_burn(&self, device: &B::Device) -> Tensor<B, 4> {
        array_to_tensor(self, device)
    }
}

/// Reads the tensor back to the host as a flat row-major vector.
/// # Errors
/// Fails if the backend cannot hand out the data as f32
pub fn tensor_to_data_float<B: Backend, const D: usize>(tensor: &Tensor<B, D>) -> Result<Vec<f32>, String> {
    tensor
        .to_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| format!("cannot read tensor data: {e:?}"))
}
