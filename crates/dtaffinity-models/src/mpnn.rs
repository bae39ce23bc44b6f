//! Message passing over directed bonds.
//!
//! Messages live on directed bonds. Each round a bond `x -> y` sums the
//! messages arriving at `x` (except the one from `y`), and the result is
//! mixed back into the bond's input projection. Atom states then collect
//! their incoming messages and the molecule embedding is their mean.
use candle_core::{DType, Device, Module, Result, Tensor};
use candle_nn::{linear, linear_no_bias, Linear, VarBuilder};
use dtaffinity_core::{MolGraph, ATOM_FDIM, BOND_FDIM};

#[derive(Clone, Debug)]
pub struct Mpnn {
    w_i: Linear,
    w_h: Linear,
    w_o: Linear,
    depth: usize,
    hidden: usize,
}

/// Rows of `source` picked by every entry of `index` (`[m, k]`), giving `[m, k, h]`.
fn index_select_nd(source: &Tensor, index: &Tensor) -> Result<Tensor> {
    let (m, k) = index.dims2()?;
    let hidden = source.dim(1)?;
    source
        .index_select(&index.flatten_all()?, 0)?
        .reshape((m, k, hidden))
}

impl Mpnn {
    pub fn load(vb: VarBuilder, hidden: usize, depth: usize) -> Result<Self> {
        let w_i = linear_no_bias(ATOM_FDIM + BOND_FDIM, hidden, vb.pp("W_i"))?;
        let w_h = linear_no_bias(hidden, hidden, vb.pp("W_h"))?;
        let w_o = linear(ATOM_FDIM + hidden, hidden, vb.pp("W_o"))?;
        Ok(Self {
            w_i,
            w_h,
            w_o,
            depth,
            hidden,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden
    }

    /// Embedding `[1, hidden]` of one molecule. The empty graph embeds to zeros.
    pub fn forward_one(&self, graph: &MolGraph, device: &Device) -> Result<Tensor> {
        if graph.is_empty() {
            return Tensor::zeros((1, self.hidden), DType::F32, device);
        }
        let (fatoms, fbonds, agraph, bgraph) = graph.to_tensors(device)?;

        let binput = self.w_i.forward(&fbonds)?;
        let mut message = binput.relu()?;
        for _ in 1..self.depth {
            let incoming = index_select_nd(&message, &bgraph)?.sum(1)?;
            let incoming = self.w_h.forward(&incoming)?;
            message = (&binput + incoming)?.relu()?;
        }

        let incoming = index_select_nd(&message, &agraph)?.sum(1)?;
        let atom_input = Tensor::cat(&[&fatoms, &incoming], 1)?;
        let atom_hiddens = self.w_o.forward(&atom_input)?.relu()?;
        atom_hiddens.mean_keepdim(0)
    }

    /// Embeddings `[batch, hidden]`, one row per graph.
    pub fn forward(&self, graphs: &[MolGraph], device: &Device) -> Result<Tensor> {
        let embeddings = graphs
            .iter()
            .map(|graph| self.forward_one(graph, device))
            .collect::<Result<Vec<_>>>()?;
        Tensor::cat(&embeddings, 0)
    }
}
