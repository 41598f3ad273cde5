//! Constants and lookup tables from RFC 3951.

/// Sample rate of every iLBC stream.
pub const SAMPLE_RATE: u32 = 8000;

pub const BLOCKL_20MS: usize = 160;
pub const BLOCKL_30MS: usize = 240;
pub const BLOCKL_MAX: usize = 240;
pub const NSUB_20MS: usize = 4;
pub const NSUB_30MS: usize = 6;
pub const NSUB_MAX: usize = 6;
pub const NASUB_20MS: usize = 2;
pub const NASUB_30MS: usize = 4;
pub const NASUB_MAX: usize = 4;
/// Sub-block length.
pub const SUBL: usize = 40;
/// Length of the start state block (two sub-blocks).
pub const STATE_LEN: usize = 80;
pub const STATE_SHORT_LEN_20MS: usize = 57;
pub const STATE_SHORT_LEN_30MS: usize = 58;

pub const NO_OF_BYTES_20MS: usize = 38;
pub const NO_OF_BYTES_30MS: usize = 50;

// LPC analysis and LSF quantization
pub const LPC_FILTERORDER: usize = 10;
pub const LPC_HALFORDER: usize = LPC_FILTERORDER / 2;
pub const LPC_CHIRP_SYNTDENUM: f32 = 0.9025;
pub const LPC_CHIRP_WEIGHTDENUM: f32 = 0.4222;
pub const LPC_LOOKBACK: usize = 60;
pub const LPC_N_20MS: usize = 1;
pub const LPC_N_30MS: usize = 2;
pub const LPC_N_MAX: usize = 2;
pub const LSF_NSPLIT: usize = 3;
pub const LSF_NUMBER_OF_STEPS: usize = 4;

// state quantization
pub const STATE_BITS: u32 = 3;
pub const SCALE_BITS: u32 = 6;

// codebook
pub const CB_NSTAGES: usize = 3;
pub const CB_EXPAND: usize = 2;
pub const CB_MEML: usize = 147;
pub const CB_HALFFILTERLEN: usize = 4;
pub const CB_FILTERLEN: usize = 2 * CB_HALFFILTERLEN;
pub const CB_RESRANGE: usize = 34;
pub const CB_MAXGAIN: f32 = 1.3;

// enhancer
pub const ENH_BLOCKL: usize = 80;
pub const ENH_BLOCKL_HALF: usize = ENH_BLOCKL / 2;
pub const ENH_HL: usize = 3;
pub const ENH_SLOP: usize = 2;
pub const ENH_OVERHANG: usize = 2;
pub const ENH_UPS0: usize = 4;
pub const ENH_FL0: usize = 3;
pub const ENH_VECTL: usize = ENH_BLOCKL + 2 * ENH_FL0;
pub const ENH_CORRDIM: usize = 2 * ENH_SLOP + 1;
pub const ENH_NBLOCKS: usize = BLOCKL_MAX / ENH_BLOCKL;
pub const ENH_NBLOCKS_EXTRA: usize = 5;
pub const ENH_NBLOCKS_TOT: usize = ENH_NBLOCKS + ENH_NBLOCKS_EXTRA;
pub const ENH_BUFL: usize = ENH_NBLOCKS_TOT * ENH_BLOCKL;
pub const ENH_ALPHA0: f32 = 0.05;

// down sampling
pub const FILTERORDER_DS: usize = 7;
pub const DELAY_DS: usize = 3;
pub const FACTOR_DS: usize = 2;

pub const EPS: f32 = 2.220446e-16;
pub const DOUBLE_MAX: f32 = 1.0e37;
pub const MIN_SAMPLE: f32 = -32768.0;
pub const MAX_SAMPLE: f32 = 32767.0;

/// High pass filter applied to the encoder input.
pub const HPI_ZERO_COEFS: [f32; 3] = [0.92727436, -1.8544941, 0.92727436];
pub const HPI_POLE_COEFS: [f32; 3] = [1.0, -1.9059465, 0.9114024];
/// High pass filter applied to the decoder output.
pub const HPO_ZERO_COEFS: [f32; 3] = [0.93980581, -1.8795834, 0.93980581];
pub const HPO_POLE_COEFS: [f32; 3] = [1.0, -1.9330735, 0.93589199];

/// Anti aliasing filter used before downsampling in the enhancer.
pub const LP_FILT_COEFS: [f32; FILTERORDER_DS] = [
    -0.066650, 0.125000, 0.316650, 0.414063, 0.316650, 0.125000, -0.066650,
];

pub const STATE_SQ3: [f32; 8] = [
    -3.719849, -2.177490, -1.130005, -0.309692, 0.444214, 1.329712, 2.436279, 3.983887,
];

/// log10 of the state block peak amplitude, 6 bit scalar quantizer.
pub static STATE_FRGQ: [f32; 64] = [
    1.000085, 1.071695, 1.140395, 1.206868, 1.277188, 1.351503, 1.429380, 1.500727,
    1.569049, 1.639599, 1.707071, 1.781531, 1.840799, 1.901550, 1.956695, 2.006750,
    2.055474, 2.102787, 2.142819, 2.183592, 2.217962, 2.257177, 2.295739, 2.332967,
    2.369248, 2.402792, 2.435080, 2.468598, 2.503394, 2.539284, 2.572944, 2.605036,
    2.636331, 2.668939, 2.698780, 2.729101, 2.759786, 2.789834, 2.818679, 2.848074,
    2.877470, 2.906899, 2.936655, 2.967804, 3.000115, 3.033367, 3.066355, 3.104231,
    3.141499, 3.183012, 3.222952, 3.265433, 3.308441, 3.350823, 3.395275, 3.442793,
    3.490801, 3.542514, 3.604064, 3.666050, 3.740994, 3.830749, 3.938770, 4.101764,
];

/// Codebook search ranges per block and stage; row 0 is the block adjacent
/// to the start state.
pub const SEARCH_RANGE: [[usize; CB_NSTAGES]; 5] = [
    [58, 58, 58],
    [108, 44, 44],
    [108, 108, 108],
    [108, 108, 108],
    [108, 108, 108],
];
/// Codebook memory used for the block adjacent to the start state.
pub const ST_MEM_L: usize = 85;
/// Codebook memory used for the remaining sub-blocks.
pub const MEM_LF: [usize; NASUB_MAX] = [147, 147, 147, 147];

/// Expansion filter for the second half of the codebook.
pub const CB_FILTERS: [f32; CB_FILTERLEN] = [
    -0.034180, 0.108887, -0.184326, 0.806152, 0.713379, -0.144043, 0.083740, -0.033691,
];

pub const GAIN_SQ3: [f32; 8] = [
    -1.000000, -0.659973, -0.330017, 0.000000, 0.250000, 0.500000, 0.750000, 1.000000,
];

pub const GAIN_SQ4: [f32; 16] = [
    -1.049988, -0.900024, -0.750000, -0.599976, -0.450012, -0.299988, -0.150024, 0.000000,
    0.150024, 0.299988, 0.450012, 0.599976, 0.750000, 0.900024, 1.049988, 1.200012,
];

pub const GAIN_SQ5: [f32; 32] = [
    0.037476, 0.075012, 0.112488, 0.150024, 0.187500, 0.224976, 0.262512, 0.299988,
    0.337524, 0.375000, 0.412476, 0.450012, 0.487488, 0.525024, 0.562500, 0.599976,
    0.637512, 0.674988, 0.712524, 0.750000, 0.787476, 0.825012, 0.862488, 0.900024,
    0.937500, 0.974976, 1.012512, 1.049988, 1.087524, 1.125000, 1.162476, 1.200012,
];

/// Fractional delay filters for upsampling by four.
pub const POLYPHASER: [f32; ENH_UPS0 * (2 * ENH_FL0 + 1)] = [
    0.000000, 0.000000, 0.000000, 1.000000, 0.000000, 0.000000, 0.000000,
    0.015625, -0.076904, 0.288330, 0.862061, -0.106445, 0.018799, -0.015625,
    0.023682, -0.124268, 0.601563, 0.601563, -0.124268, 0.023682, -0.023682,
    0.018799, -0.106445, 0.862061, 0.288330, -0.076904, 0.015625, -0.018799,
];

/// Centre of every enhancer block in the history buffer.
pub const ENH_PLOCS: [f32; ENH_NBLOCKS_TOT] =
    [40.0, 120.0, 200.0, 280.0, 360.0, 440.0, 520.0, 600.0];

pub const LSF_DIM_CB: [usize; LSF_NSPLIT] = [3, 3, 4];
pub const LSF_SIZE_CB: [usize; LSF_NSPLIT] = [64, 128, 128];

pub const LSF_MEAN: [f32; LPC_FILTERORDER] = [
    0.281738, 0.445801, 0.663330, 0.962524, 1.251831, 1.533081, 1.850586, 2.137817, 2.481445,
    2.777344,
];

/// LSF interpolation weights of the previous frame, one per sub-block.
pub const LSF_WEIGHT_20MS: [f32; 4] = [3.0 / 4.0, 2.0 / 4.0, 1.0 / 4.0, 0.0];
pub const LSF_WEIGHT_30MS: [f32; 6] = [1.0 / 2.0, 1.0, 2.0 / 3.0, 1.0 / 3.0, 0.0, 0.0];

/// Hanning window for the first analysis of a 30 ms frame.
pub static LPC_WIN: [f32; BLOCKL_MAX] = [
    0.000183, 0.000671, 0.001526, 0.002716, 0.004242, 0.006104, 0.008301, 0.010834,
    0.013702, 0.016907, 0.020416, 0.024261, 0.028442, 0.032928, 0.037750, 0.042877,
    0.048309, 0.054047, 0.060089, 0.066437, 0.073090, 0.080017, 0.087219, 0.094727,
    0.102509, 0.110535, 0.118835, 0.127411, 0.136230, 0.145294, 0.154602, 0.164154,
    0.173920, 0.183899, 0.194122, 0.204529, 0.215149, 0.225952, 0.236938, 0.248108,
    0.259460, 0.270966, 0.282654, 0.294464, 0.306396, 0.318481, 0.330688, 0.343018,
    0.355438, 0.367981, 0.380585, 0.393280, 0.406067, 0.418884, 0.431763, 0.444702,
    0.457672, 0.470673, 0.483704, 0.496735, 0.509766, 0.522797, 0.535828, 0.548798,
    0.561768, 0.574677, 0.587524, 0.600342, 0.613068, 0.625732, 0.638306, 0.650787,
    0.663147, 0.675415, 0.687561, 0.699585, 0.711487, 0.723206, 0.734802, 0.746216,
    0.757477, 0.768585, 0.779480, 0.790192, 0.800720, 0.811005, 0.821106, 0.830994,
    0.840668, 0.850067, 0.859253, 0.868225, 0.876892, 0.885345, 0.893524, 0.901428,
    0.909058, 0.916412, 0.923492, 0.930267, 0.936768, 0.942963, 0.948853, 0.954437,
    0.959717, 0.964691, 0.969360, 0.973694, 0.977692, 0.981384, 0.984741, 0.987762,
    0.990479, 0.992828, 0.994873, 0.996552, 0.997925, 0.998932, 0.999603, 0.999969,
    0.999969, 0.999603, 0.998932, 0.997925, 0.996552, 0.994873, 0.992828, 0.990479,
    0.987762, 0.984741, 0.981384, 0.977692, 0.973694, 0.969360, 0.964691, 0.959717,
    0.954437, 0.948853, 0.942963, 0.936768, 0.930267, 0.923492, 0.916412, 0.909058,
    0.901428, 0.893524, 0.885345, 0.876892, 0.868225, 0.859253, 0.850067, 0.840668,
    0.830994, 0.821106, 0.811005, 0.800720, 0.790192, 0.779480, 0.768585, 0.757477,
    0.746216, 0.734802, 0.723206, 0.711487, 0.699585, 0.687561, 0.675415, 0.663147,
    0.650787, 0.638306, 0.625732, 0.613068, 0.600342, 0.587524, 0.574677, 0.561768,
    0.548798, 0.535828, 0.522797, 0.509766, 0.496735, 0.483704, 0.470673, 0.457672,
    0.444702, 0.431763, 0.418884, 0.406067, 0.393280, 0.380585, 0.367981, 0.355438,
    0.343018, 0.330688, 0.318481, 0.306396, 0.294464, 0.282654, 0.270966, 0.259460,
    0.248108, 0.236938, 0.225952, 0.215149, 0.204529, 0.194122, 0.183899, 0.173920,
    0.164154, 0.154602, 0.145294, 0.136230, 0.127411, 0.118835, 0.110535, 0.102509,
    0.094727, 0.087219, 0.080017, 0.073090, 0.066437, 0.060089, 0.054047, 0.048309,
    0.042877, 0.037750, 0.032928, 0.028442, 0.024261, 0.020416, 0.016907, 0.013702,
    0.010834, 0.008301, 0.006104, 0.004242, 0.002716, 0.001526, 0.000671, 0.000183,
];

/// Asymmetric window for the last analysis of a frame.
pub static LPC_ASYMWIN: [f32; BLOCKL_MAX] = [
    0.000000, 0.000061, 0.000214, 0.000458, 0.000824, 0.001282, 0.001831, 0.002502,
    0.003265, 0.004120, 0.005096, 0.006165, 0.007324, 0.008606, 0.009949, 0.011414,
    0.013000, 0.014648, 0.016418, 0.018280, 0.020264, 0.022308, 0.024475, 0.026733,
    0.029083, 0.031525, 0.034058, 0.036713, 0.039429, 0.042267, 0.045197, 0.048187,
    0.051300, 0.054504, 0.057770, 0.061157, 0.064636, 0.068176, 0.071838, 0.075562,
    0.079376, 0.083282, 0.087250, 0.091339, 0.095490, 0.099731, 0.104034, 0.108459,
    0.112915, 0.117493, 0.122131, 0.126831, 0.131622, 0.136505, 0.141449, 0.146454,
    0.151520, 0.156677, 0.161926, 0.167206, 0.172577, 0.178009, 0.183502, 0.189056,
    0.194672, 0.200348, 0.206116, 0.211914, 0.217773, 0.223694, 0.229675, 0.235718,
    0.241791, 0.247955, 0.254120, 0.260376, 0.266663, 0.273010, 0.279388, 0.285828,
    0.292297, 0.298798, 0.305359, 0.311951, 0.318604, 0.325256, 0.331970, 0.338715,
    0.345490, 0.352295, 0.359131, 0.365997, 0.372894, 0.379822, 0.386749, 0.393707,
    0.400696, 0.407715, 0.414734, 0.421783, 0.428833, 0.435913, 0.442993, 0.450104,
    0.457214, 0.464325, 0.471466, 0.478577, 0.485718, 0.492859, 0.500000, 0.507141,
    0.514282, 0.521423, 0.528534, 0.535675, 0.542786, 0.549896, 0.557007, 0.564087,
    0.571167, 0.578217, 0.585266, 0.592285, 0.599304, 0.606293, 0.613251, 0.620178,
    0.627106, 0.634003, 0.640869, 0.647705, 0.654510, 0.661285, 0.668030, 0.674744,
    0.681396, 0.688049, 0.694641, 0.701202, 0.707703, 0.714172, 0.720612, 0.726990,
    0.733337, 0.739624, 0.745880, 0.752045, 0.758209, 0.764282, 0.770325, 0.776306,
    0.782227, 0.788086, 0.793884, 0.799652, 0.805328, 0.810944, 0.816498, 0.821991,
    0.827423, 0.832794, 0.838074, 0.843323, 0.848480, 0.853546, 0.858551, 0.863495,
    0.868378, 0.873169, 0.877869, 0.882507, 0.887085, 0.891541, 0.895966, 0.900269,
    0.904510, 0.908661, 0.912750, 0.916718, 0.920624, 0.924438, 0.928162, 0.931824,
    0.935364, 0.938843, 0.942230, 0.945496, 0.948700, 0.951813, 0.954803, 0.957733,
    0.960571, 0.963287, 0.965942, 0.968475, 0.970917, 0.973267, 0.975525, 0.977692,
    0.979736, 0.981720, 0.983582, 0.985352, 0.987000, 0.988586, 0.990051, 0.991394,
    0.992676, 0.993835, 0.994904, 0.995880, 0.996735, 0.997498, 0.998169, 0.998718,
    0.999176, 0.999542, 0.999786, 0.999939, 1.000000, 0.996918, 0.987701, 0.972382,
    0.951050, 0.923889, 0.891022, 0.852631, 0.809021, 0.760406, 0.707092, 0.649445,
    0.587799, 0.522491, 0.453979, 0.382690, 0.309021, 0.233459, 0.156433, 0.078461,
];

/// Lag window applied to the autocorrelation, 60 Hz bandwidth expansion.
pub const LPC_LAGWIN: [f32; LPC_FILTERORDER + 1] = [
    1.000100, 0.998890, 0.995569, 0.990057, 0.982392, 0.972623,
    0.960816, 0.947047, 0.931405, 0.913989, 0.894909,
];

/// Split VQ codebooks, stored one split after the other.
pub static LSF_CB: [f32; 64 * 3 + 128 * 3 + 128 * 4] = [
    // split 1
    0.155396, 0.273193, 0.451172,
    0.390503, 0.648071, 1.002075,
    0.440186, 0.692261, 0.955688,
    0.343628, 0.642334, 1.071533,
    0.318359, 0.491577, 0.670532,
    0.193115, 0.375488, 0.725708,
    0.364136, 0.510376, 0.658691,
    0.297485, 0.527588, 0.842529,
    0.227173, 0.365967, 0.563110,
    0.244995, 0.396729, 0.636475,
    0.169434, 0.300171, 0.520264,
    0.312866, 0.464478, 0.643188,
    0.248535, 0.429932, 0.626099,
    0.236206, 0.491333, 0.817139,
    0.334961, 0.625122, 0.895752,
    0.343018, 0.518555, 0.698608,
    0.372803, 0.659790, 0.945435,
    0.176880, 0.316528, 0.581421,
    0.416382, 0.625977, 0.805176,
    0.303223, 0.568726, 0.915039,
    0.203613, 0.351440, 0.588135,
    0.221191, 0.375000, 0.614746,
    0.199951, 0.323364, 0.476074,
    0.300781, 0.433350, 0.566895,
    0.226196, 0.354004, 0.507568,
    0.300049, 0.508179, 0.711670,
    0.312012, 0.492676, 0.763428,
    0.329956, 0.541016, 0.795776,
    0.373779, 0.604614, 0.928833,
    0.210571, 0.452026, 0.755249,
    0.271118, 0.473267, 0.662476,
    0.285522, 0.436890, 0.634399,
    0.246704, 0.565552, 0.859009,
    0.270508, 0.406250, 0.553589,
    0.361450, 0.578491, 0.813843,
    0.342651, 0.482788, 0.622437,
    0.340332, 0.549438, 0.743164,
    0.200439, 0.336304, 0.540894,
    0.407837, 0.644775, 0.895142,
    0.294678, 0.454834, 0.699097,
    0.193115, 0.344482, 0.643188,
    0.275757, 0.420776, 0.598755,
    0.380493, 0.608643, 0.861084,
    0.222778, 0.426147, 0.676514,
    0.407471, 0.700195, 1.053101,
    0.218384, 0.377197, 0.669922,
    0.313232, 0.454102, 0.600952,
    0.347412, 0.571533, 0.874146,
    0.238037, 0.405396, 0.729492,
    0.223877, 0.412964, 0.822021,
    0.395264, 0.582153, 0.743896,
    0.247925, 0.485596, 0.720581,
    0.229126, 0.496582, 0.907715,
    0.260132, 0.566895, 1.012695,
    0.337402, 0.611572, 0.978149,
    0.267822, 0.447632, 0.769287,
    0.250610, 0.381714, 0.530029,
    0.430054, 0.805054, 1.221924,
    0.382568, 0.544067, 0.701660,
    0.383545, 0.710327, 1.149170,
    0.271362, 0.529053, 0.775513,
    0.246826, 0.393555, 0.588623,
    0.266846, 0.422119, 0.676758,
    0.311523, 0.580688, 0.838623,
    // split 2
    1.331177, 1.576782, 1.779541,
    1.160034, 1.401978, 1.768188,
    1.161865, 1.525146, 1.715332,
    0.759521, 0.913940, 1.119873,
    0.947144, 1.121338, 1.282471,
    1.015015, 1.557007, 1.804932,
    1.172974, 1.402100, 1.692627,
    1.087524, 1.474243, 1.665405,
    0.663818, 1.077881, 1.325439,
    0.882690, 1.253662, 1.464111,
    1.004272, 1.191162, 1.417847,
    1.148071, 1.439087, 1.622803,
    1.041870, 1.186157, 1.526245,
    1.045654, 1.254028, 1.440552,
    0.820557, 1.220215, 1.453613,
    1.173096, 1.333618, 1.574585,
    1.077393, 1.380615, 1.627075,
    1.067627, 1.292725, 1.639160,
    0.922607, 1.184692, 1.418091,
    1.231079, 1.398804, 1.621582,
    0.841553, 1.153809, 1.351562,
    1.028564, 1.328247, 1.683105,
    0.829590, 0.976562, 1.218750,
    1.140259, 1.482544, 1.718872,
    0.951416, 1.220703, 1.404663,
    1.103882, 1.359253, 1.514282,
    0.941406, 1.071655, 1.334717,
    1.004517, 1.362305, 1.570557,
    1.081665, 1.212036, 1.410034,
    1.141968, 1.290527, 1.437500,
    0.964844, 1.305298, 1.508423,
    0.897217, 1.037231, 1.244629,
    1.173584, 1.431641, 1.614258,
    0.988525, 1.309692, 1.665039,
    1.085938, 1.299438, 1.475098,
    1.217163, 1.388794, 1.553711,
    0.990112, 1.146973, 1.362305,
    0.924805, 1.243774, 1.497192,
    1.026733, 1.432251, 1.699707,
    1.155518, 1.365112, 1.546753,
    1.086914, 1.254639, 1.388672,
    0.797241, 1.109863, 1.439819,
    0.995605, 1.163086, 1.310425,
    1.078247, 1.478638, 1.650879,
    0.975952, 1.126709, 1.271973,
    1.051880, 1.384766, 1.592041,
    0.946899, 1.278809, 1.436279,
    1.154907, 1.526245, 1.742920,
    1.094604, 1.265991, 1.587524,
    0.891113, 1.157959, 1.299316,
    1.186035, 1.326782, 1.495972,
    0.871216, 1.066895, 1.315674,
    1.086304, 1.230957, 1.359131,
    0.964478, 1.343140, 1.571289,
    0.856445, 1.190063, 1.585938,
    1.141846, 1.469971, 1.593506,
    1.048096, 1.259888, 1.539185,
    0.918823, 1.314941, 1.660522,
    0.988403, 1.228271, 1.516357,
    0.987305, 1.451660, 1.708130,
    1.101807, 1.407593, 1.589233,
    1.258179, 1.467041, 1.678101,
    1.053711, 1.311279, 1.449829,
    0.946411, 1.154419, 1.372803,
    0.922974, 1.344727, 1.539795,
    1.197510, 1.403564, 1.584473,
    1.005615, 1.158569, 1.404907,
    1.145752, 1.337402, 1.501953,
    1.010742, 1.236694, 1.351318,
    0.987061, 1.357544, 1.556274,
    1.113770, 1.265625, 1.497925,
    0.772583, 1.055664, 1.319946,
    1.063721, 1.331055, 1.528687,
    0.829468, 1.036011, 1.310303,
    1.186279, 1.432983, 1.655640,
    1.098755, 1.365601, 1.515625,
    1.178345, 1.497681, 1.699829,
    1.051880, 1.157104, 1.310547,
    1.112793, 1.315063, 1.602905,
    0.947510, 1.174316, 1.477051,
    1.047119, 1.379272, 1.536133,
    1.222046, 1.524658, 1.657715,
    0.928711, 1.124268, 1.318237,
    1.061646, 1.261841, 1.455444,
    1.077393, 1.455444, 1.600830,
    0.894165, 1.258057, 1.530640,
    1.132080, 1.283569, 1.465576,
    1.039062, 1.252930, 1.395264,
    1.131348, 1.374634, 1.561646,
    0.997803, 1.191284, 1.305420,
    0.878540, 1.115845, 1.407959,
    1.190674, 1.383057, 1.512573,
    1.080200, 1.338379, 1.486450,
    0.988647, 1.175049, 1.558228,
    1.143555, 1.394043, 1.626587,
    1.005737, 1.249634, 1.550903,
    1.197266, 1.400391, 1.515625,
    0.948608, 1.297485, 1.442261,
    0.875610, 1.165405, 1.347656,
    1.101318, 1.449585, 1.579224,
    0.817017, 1.063232, 1.251953,
    1.129761, 1.240356, 1.454224,
    1.008179, 1.429199, 1.592896,
    0.816895, 0.962646, 1.214233,
    1.027954, 1.195801, 1.348755,
    1.136841, 1.294556, 1.543579,
    1.180054, 1.485474, 1.609131,
    0.918091, 1.398560, 1.559814,
    1.061523, 1.208496, 1.455200,
    0.890137, 1.197388, 1.475708,
    1.007324, 1.328613, 1.472046,
    1.158936, 1.367188, 1.489990,
    1.011963, 1.294800, 1.599487,
    1.106201, 1.323730, 1.436157,
    1.205688, 1.362061, 1.643433,
    1.003174, 1.201172, 1.330933,
    0.954346, 1.232300, 1.379395,
    1.107178, 1.382568, 1.624512,
    1.081909, 1.209961, 1.541992,
    1.246826, 1.511475, 1.775513,
    1.018555, 1.394653, 1.687500,
    1.128052, 1.406128, 1.544189,
    1.151123, 1.338013, 1.584229,
    1.114624, 1.222046, 1.370483,
    1.248901, 1.614624, 1.815186,
    1.000366, 1.359741, 1.616577,
    1.042358, 1.171387, 1.447144,
    0.903442, 1.097412, 1.279297,
    // split 3
    2.002075, 2.338257, 2.620483, 2.837158,
    2.129883, 2.427734, 2.663086, 2.862549,
    1.768311, 2.198364, 2.479736, 2.703369,
    2.003418, 2.276245, 2.489014, 2.749878,
    1.880981, 2.133911, 2.482056, 2.740356,
    1.751221, 2.226807, 2.579712, 2.845459,
    2.000000, 2.225098, 2.537354, 2.788330,
    2.028687, 2.376221, 2.638550, 2.843750,
    1.865234, 2.331665, 2.548218, 2.780762,
    1.907715, 2.181763, 2.467163, 2.818481,
    1.745605, 2.037720, 2.428223, 2.719849,
    1.945923, 2.345947, 2.629150, 2.858765,
    1.843506, 2.158447, 2.486450, 2.770752,
    2.055176, 2.302002, 2.571289, 2.819946,
    1.895386, 2.273560, 2.579346, 2.817993,
    1.978149, 2.249878, 2.545410, 2.764893,
    1.795410, 2.151367, 2.575073, 2.855713,
    1.894653, 2.272217, 2.454590, 2.712769,
    2.073608, 2.364258, 2.641724, 2.841064,
    1.898193, 2.144287, 2.415894, 2.696289,
    1.988281, 2.249390, 2.457520, 2.652710,
    2.098022, 2.437500, 2.702637, 2.860229,
    1.813843, 2.289917, 2.531982, 2.746338,
    1.954468, 2.349121, 2.574829, 2.766724,
    1.920776, 2.201782, 2.470947, 2.782227,
    1.742554, 2.165771, 2.511230, 2.795166,
    2.045166, 2.343872, 2.608643, 2.813232,
    1.965698, 2.238770, 2.501709, 2.724854,
    1.852539, 2.186157, 2.423340, 2.675659,
    2.022705, 2.302856, 2.581055, 2.807373,
    1.849243, 2.251709, 2.608765, 2.861328,
    2.078735, 2.328491, 2.534302, 2.771606,
    1.907593, 2.310425, 2.550049, 2.760010,
    1.805176, 2.111694, 2.442627, 2.744995,
    1.958618, 2.210815, 2.512329, 2.848022,
    2.031128, 2.390991, 2.617676, 2.815796,
    1.852295, 2.225586, 2.434692, 2.669067,
    1.909546, 2.282471, 2.626953, 2.866577,
    1.997925, 2.331787, 2.521362, 2.719604,
    1.883789, 2.187256, 2.496704, 2.779175,
    1.961060, 2.265503, 2.591064, 2.838135,
    1.809814, 2.192017, 2.463257, 2.709106,
    2.056763, 2.344360, 2.564941, 2.764648,
    1.940918, 2.249512, 2.466675, 2.701782,
    1.874390, 2.257080, 2.574219, 2.820557,
    2.077515, 2.386963, 2.596069, 2.792603,
    1.797119, 2.078003, 2.379639, 2.681152,
    1.985229, 2.313843, 2.629883, 2.857666,
    1.911255, 2.221680, 2.538940, 2.829712,
    1.863647, 2.234863, 2.542969, 2.759033,
    2.015259, 2.280518, 2.485840, 2.717773,
    1.947998, 2.352173, 2.612427, 2.835449,
    1.791748, 2.252686, 2.561890, 2.814209,
    2.043335, 2.325195, 2.615112, 2.846313,
    1.869995, 2.161499, 2.449585, 2.755615,
    1.982788, 2.281982, 2.545776, 2.787109,
    1.917969, 2.354492, 2.648193, 2.869873,
    1.835693, 2.195923, 2.509155, 2.773926,
    2.062744, 2.352539, 2.582642, 2.790039,
    1.898071, 2.243408, 2.509644, 2.742065,
    1.770752, 2.133423, 2.464844, 2.768188,
    1.993164, 2.286987, 2.557007, 2.808350,
    2.003540, 2.367676, 2.649170, 2.856567,
    1.881226, 2.208496, 2.432373, 2.661621,
    1.956177, 2.290894, 2.598389, 2.849976,
    1.822876, 2.229004, 2.520508, 2.780884,
    2.102051, 2.396729, 2.619385, 2.816406,
    1.931152, 2.191650, 2.447632, 2.746704,
    1.860596, 2.295776, 2.595703, 2.838379,
    1.979614, 2.255371, 2.477783, 2.700317,
    1.849731, 2.170410, 2.557129, 2.852417,
    2.037354, 2.313354, 2.540405, 2.749512,
    1.936890, 2.322510, 2.596313, 2.800171,
    1.779663, 2.106934, 2.417969, 2.722290,
    2.021240, 2.362671, 2.628662, 2.840088,
    1.905640, 2.246338, 2.584229, 2.856934,
    1.882080, 2.204224, 2.470215, 2.794434,
    1.993652, 2.271240, 2.530273, 2.753052,
    1.841553, 2.264404, 2.537842, 2.744751,
    2.058960, 2.383179, 2.628906, 2.827148,
    1.928589, 2.213013, 2.503418, 2.813477,
    1.797363, 2.172852, 2.490479, 2.786377,
    1.971924, 2.300415, 2.563965, 2.779297,
    1.885986, 2.316162, 2.612305, 2.843506,
    1.970093, 2.224731, 2.448975, 2.676270,
    2.049194, 2.343018, 2.586670, 2.802979,
    1.824951, 2.197754, 2.536255, 2.832886,
    1.917114, 2.268188, 2.522217, 2.729736,
    2.011230, 2.330322, 2.598999, 2.840820,
    1.864868, 2.221436, 2.491821, 2.727661,
    1.946289, 2.291016, 2.626465, 2.863770,
    1.804321, 2.146606, 2.456421, 2.749390,
    2.079590, 2.350952, 2.575317, 2.783691,
    1.914917, 2.280762, 2.568970, 2.797974,
    1.851562, 2.171997, 2.428467, 2.687500,
    1.996582, 2.276489, 2.521606, 2.768677,
    1.906494, 2.343140, 2.611450, 2.816284,
    1.765991, 2.161987, 2.530640, 2.820190,
    2.029297, 2.314575, 2.574707, 2.800537,
    1.936157, 2.209839, 2.486206, 2.790649,
    1.855225, 2.256592, 2.550537, 2.775024,
    2.062378, 2.368042, 2.606323, 2.823486,
    1.888794, 2.188232, 2.458496, 2.714111,
    1.978394, 2.327148, 2.617554, 2.855103,
    1.830566, 2.213745, 2.480713, 2.738770,
    2.018799, 2.287720, 2.532349, 2.756714,
    1.919556, 2.295898, 2.597168, 2.829468,
    1.871704, 2.240601, 2.519409, 2.768433,
    1.999146, 2.351196, 2.634888, 2.848999,
    1.790161, 2.117798, 2.395508, 2.693970,
    1.968018, 2.270142, 2.556030, 2.808594,
    1.902466, 2.227051, 2.539917, 2.834106,
    1.846313, 2.183594, 2.474854, 2.760620,
    2.039795, 2.330688, 2.561523, 2.779541,
    1.939209, 2.304443, 2.583862, 2.812012,
    1.816406, 2.247559, 2.577148, 2.839233,
    1.986450, 2.294189, 2.513916, 2.738525,
    1.879761, 2.217285, 2.503906, 2.806519,
    2.087524, 2.374268, 2.613159, 2.809448,
    1.924438, 2.262939, 2.555176, 2.783081,
    1.866821, 2.201172, 2.512817, 2.816895,
    1.989014, 2.309326, 2.606079, 2.831543,
    1.838379, 2.160645, 2.443726, 2.725586,
    2.026001, 2.341064, 2.620605, 2.852173,
    1.909302, 2.230347, 2.473999, 2.704590,
    1.784912, 2.189941, 2.506470, 2.801392,
    1.959839, 2.321777, 2.591675, 2.822998,
    1.893555, 2.255127, 2.525269, 2.752319,
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tables_are_sorted() {
        assert!(STATE_FRGQ.windows(2).all(|w| w[0] < w[1]));
        assert!(STATE_SQ3.windows(2).all(|w| w[0] < w[1]));
        assert!(GAIN_SQ5.windows(2).all(|w| w[0] < w[1]));
        assert!(GAIN_SQ4.windows(2).all(|w| w[0] < w[1]));
        assert!(GAIN_SQ3.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_lsf_codebook_layout() {
        let total: usize = LSF_DIM_CB
            .iter()
            .zip(LSF_SIZE_CB.iter())
            .map(|(d, s)| d * s)
            .sum();
        assert_eq!(total, LSF_CB.len());
        assert_eq!(LSF_DIM_CB.iter().sum::<usize>(), LPC_FILTERORDER);
    }

    #[test]
    fn test_windows() {
        // symmetric window
        for n in 0..BLOCKL_MAX / 2 {
            assert_eq!(LPC_WIN[n], LPC_WIN[BLOCKL_MAX - 1 - n]);
        }
        assert_eq!(LPC_ASYMWIN[0], 0.0);
        assert_eq!(LPC_ASYMWIN[220], 1.0);
    }
}
