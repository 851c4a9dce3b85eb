// SPDX-License-Identifier: LGPL-3.0-or-later

//! Fixed filter designs baked in as constants.
//!
//! Tables are designed offline and are part of the filter contract: the
//! order of sections and the coefficient values encode specific cutoffs
//! and stopbands. Second-order sections are stored as
//! `[b0, b1, b2, a1, a2]` with `a0 = 1`, and are applied from index 0
//! upward.

// ─── Second-order-section tables ───────────────────────────────────────────

/// Elliptic lowpass at one third of the band, used by the full
/// anti-aliased DSB modulator at 3x rate.
#[rustfmt::skip]
pub const SOS_ONE_THIRD_LOWPASS: [[f64; 5]; 8] = [
    [1.4299700336859399e-05, 2.6223643283408427e-05, 1.4299700336859402e-05, -1.419010779886042, 0.5152639120776978],
    [1.0, 0.9374859430410645, 1.0, -1.374108854632666, 0.569988993082886],
    [1.0, 0.1350973292280386, 0.9999999999999998, -1.3033222470303198, 0.6571339849004512],
    [1.0, -0.3463388380253702, 1.0000000000000002, -1.2300429244541804, 0.7495761953198858],
    [1.0, -0.6140989162812137, 1.0, -1.1698275005007623, 0.8300611494196282],
    [1.0, -0.7615991375114761, 1.0000000000000002, -1.1287956505319012, 0.8934017825312789],
    [1.0, -0.83977959367167, 1.0000000000000002, -1.1078055040479997, 0.9420069143074725],
    [1.0, -0.87372678641345, 1.0000000000000002, -1.1067875902296604, 0.9815369953292316],
];

/// Elliptic bandpass keeping `[1/6, ~1.925/6]` of the 3x rate.
#[rustfmt::skip]
pub const SOS_ONE_THIRD_BANDPASS: [[f64; 5]; 16] = [
    [0.07996306031918912, -0.15512096495683905, 0.07996306031918912, -0.04905756091899954, 0.06089317414996781],
    [1.0, -1.605912361850232, 1.0, -0.3914194433835788, 0.39780395780767436],
    [1.0, -1.3044450264840837, 1.0, -0.69851818886442, 0.7000220928086291],
    [1.0, -1.1386205501393927, 0.9999999999999999, -0.8666910823954345, 0.8655475347010958],
    [1.0, -1.0617196394441732, 1.0000000000000002, -0.9445579714023477, 0.9422516172059531],
    [1.0, -1.0283402094063119, 1.0000000000000002, -0.9784715696658016, 0.9758114926561893],
    [1.0, -1.0144993240335434, 1.0, -0.9928926526136225, 0.990449173400009],
    [1.0, -1.0095384322002112, 1.0, -0.998957500114774, 0.9974851593731303],
    [0.003929281896699457, 0.007783864623170485, 0.003929281896699457, -0.6125926872786202, 0.13187643733994786],
    [1.0, 1.8466736192584305, 1.0, -0.3190661665817673, 0.29140967523377553],
    [1.0, 1.648795055047372, 0.9999999999999998, 0.06076167121153805, 0.4984243325343967],
    [1.0, 1.459139853427764, 0.9999999999999998, 0.37703985322489586, 0.6721138263458347],
    [1.0, 1.3116532086335044, 0.9999999999999999, 0.5973914775512698, 0.7955385873005747],
    [1.0, 1.2109484406557494, 1.0, 0.7387197862035764, 0.8788571064087001],
    [1.0, 1.1502952430178814, 0.9999999999999998, 0.824163636062829, 0.9362950931513307],
    [1.0, 1.1221376470808058, 0.9999999999999999, 0.8708683205996026, 0.980025035115969],
];

/// Elliptic highpass above a quarter of the 2x rate. Removes the image
/// left by the lower sideband modulator.
#[rustfmt::skip]
pub const SOS_HALF_HIGHPASS: [[f64; 5]; 8] = [
    [0.022533030123118865, -0.0411189601921383, 0.022533030123118865, 0.5209635159310878, 0.1207066785590715],
    [1.0, -1.011674456291376, 1.0000000000000002, 0.3573911427742562, 0.39490425738945695],
    [1.0, -0.45091438753049795, 0.9999999999999999, 0.188876540910701, 0.677405647200568],
    [1.0, -0.19288475235068764, 1.0, 0.08617820982686307, 0.8496269018092625],
    [1.0, -0.08311788874077465, 1.0000000000000002, 0.03583311445085322, 0.9341951501489619],
    [1.0, -0.03724249975861203, 0.9999999999999999, 0.013408644836165261, 0.972208991199606],
    [1.0, -0.018521267756271977, 1.0000000000000002, 0.004004687637778214, 0.9889883586768273],
    [1.0, -0.011853373888226475, 1.0, 0.0006172958500284454, 0.9970964690788071],
];

/// 12th order Butterworth lowpass at 0.032 of the 16x rate, first stage
/// of the 16x → 1x decimation. Every section has unity DC gain.
#[rustfmt::skip]
pub const SOS_DECIMATION_16: [[f64; 5]; 6] = [
    [0.008407731011388734, 0.016815462022777467, 0.008407731011388734, -1.6358161595128016, 0.6694470835583564],
    [0.008503508730040835, 0.01700701746008167, 0.008503508730040835, -1.6544507637455195, 0.6884647986656827],
    [0.008694855809299256, 0.01738971161859851, 0.008694855809299256, -1.6916794338709686, 0.7264588571081656],
    [0.008980645274670634, 0.017961290549341268, 0.008980645274670634, -1.7472829046575307, 0.7832054857562132],
    [0.00935733307017465, 0.0187146661403493, 0.00935733307017465, -1.8205716411956117, 0.8580009734763101],
    [0.009816581222408496, 0.01963316244481699, 0.009816581222408496, -1.9099233994325149, 0.9491897243221489],
];

// ─── Half-band allpass coefficients ────────────────────────────────────────

// Elliptic two-path design: 16 coefficients, transition band 0.01 of the
// 2x rate, about 140 dB stopband attenuation.

/// Allpass coefficients of half-band path 0 (earlier sample when
/// down-sampling, second output when up-sampling).
pub const HALF_BAND_PATH0: [f64; 8] = [
    0.08159778090590261,
    0.2791081664465183,
    0.500624429423833,
    0.6838132915011228,
    0.8125716739213795,
    0.8963038051219334,
    0.9508423666001653,
    0.9907807661543516,
];

/// Allpass coefficients of half-band path 1.
pub const HALF_BAND_PATH1: [f64; 8] = [
    0.021274801903768466,
    0.17163632098387976,
    0.39196028503945063,
    0.5989125440102054,
    0.7547234775489575,
    0.8590884928249939,
    0.9262533614845644,
    0.9718135483260977,
];

// ─── Polyphase FIR ─────────────────────────────────────────────────────────

/// 16-phase windowed-sinc (Kaiser, beta 8) interpolation filter, 32 taps per
/// phase. Phase `i` produces output `i` of each 16 sample frame, and every
/// phase sums to about 1. Group delay is 255.5 samples at the 16x rate.
#[rustfmt::skip]
pub const FIR_UP_16: [[f64; 32]; 16] = [
    [
        -4.5697180381745295e-06, 2.0051169088573697e-05, -5.3085626355501405e-05, 0.00011406512721794465,
        -0.00021655102177498171, 0.00037762049031985536, -0.0006183756223045883, 0.0009649514768014592,
        -0.0014507023184778282, 0.002120984522420068, -0.0030437578936296584, 0.004334250660969994,
        -0.006218321636340866, 0.009225236783410116, -0.014968854009375034, 0.03176621664611075,
        0.9984017443309292, -0.02978621973169452, 0.014454770883722585, -0.008984626890808712,
        0.006075814306983012, -0.004239439686105281, 0.002976866987267436, -0.002072564019940537,
        0.0014154900961046797, -0.0009396057129744144, 0.0006005293686917014, -0.00036546047829536833,
        0.00020862539851188228, -0.00010919549883566059, 5.03253547672167e-05, -1.8661276253189432e-05,
    ],
    [
        -1.5338868439559094e-05, 6.369955954437683e-05, -0.00016571180840398693, 0.0003527104843649451,
        -0.0006654773479267724, 0.0011552796196186775, -0.0018854335476474367, 0.0029344343549750672,
        -0.004402755377311795, 0.006427725682545795, -0.009216566070237955, 0.013123601938225557,
        -0.018850257364596047, 0.028061917129719446, -0.04594889134118639, 0.10073933988574606,
        0.9854994473261501, -0.0830109615667737, 0.04137294149091822, -0.025922503499068297,
        0.017583597849691504, -0.01228102021555562, 0.008622155323529165, -0.005997464529254869,
        0.004089867097375367, -0.002709217540523509, 0.0017268539230538432, -0.0010472247004489972,
        0.0005950468745676616, -0.0003094343103411143, 0.00014117906121371906, -5.1344400271562384e-05,
    ],
    [
        -2.8031913204521547e-05, 0.00011078813900222546, -0.00028343060206865246, 0.0005977570066149793,
        -0.0011210046638057058, 0.0019375600836701637, -0.0031515952002924793, 0.0048923975545770515,
        -0.007325964819535918, 0.010680381610628446, -0.015302279429675268, 0.021789426587451588,
        -0.031337093996885716, 0.04682160157055781, -0.07741377150949195, 0.1759922816670577,
        0.9599984717918447, -0.12725246333879608, 0.06498275625544764, -0.04102220468240517,
        0.027906019814066423, -0.019507805430721472, 0.013692929865015548, -0.009515552040412044,
        0.006478921621446325, -0.00428269754924224, 0.00272228366578865, -0.0016450168024111976,
        0.0009303095956496558, -0.0004805700192369391, 0.00021698606146189478, -7.731421543398333e-05,
    ],
    [
        -4.219499427853514e-05, 0.0001594478392377968, -0.0004014554030581783, 0.0008391622949440381,
        -0.001564424368938752, 0.0026923447390528195, -0.004364961200176948, 0.006758770370672165,
        -0.010101113292599107, 0.014706049017402495, -0.021054336712571054, 0.029982199568498683,
        -0.04317878901603715, 0.06476531899775548, -0.10819808629208309, 0.25617529220225127,
        0.9224974521886369, -0.16211647523047504, 0.08464540084576604, -0.05381313747512476,
        0.03670632807542259, -0.025680160714865254, 0.018020589698614774, -0.01251051049830309,
        0.00850463428444761, -0.00560963151584834, 0.0035557842238147035, -0.00214091310505993,
        0.0012049310172646851, -0.0006182050631989125, 0.0002761378692980198, -9.628284702266641e-05,
    ],
    [
        -5.7200781092504215e-05, 0.00020748819162883127, -0.0005144949046044454, 0.001066184206044781,
        -0.0019761623827066386, 0.0033865736418280594, -0.005472774807184656, 0.00845295396850634,
        -0.012609097007771259, 0.018332906893397883, -0.02622841487244443, 0.037355406272538486,
        -0.05387679023136462, 0.08114484806659979, -0.13707557541953935, 0.3397614640134265,
        0.8738731023255941, -0.1874719703331647, 0.09989804553717972, -0.06393276092694283,
        0.043719889580903, -0.03060877181344696, 0.021472258307840227, -0.01489138423724612,
        0.010106766444770333, -0.006651794630973532, 0.004204414550283726, -0.002522140302794012,
        0.0014125285243578234, -0.0007196728218513193, 0.00031789389762247995, -0.00010832756742593826,
    ],
    [
        -7.226263872565866e-05, 0.00025247174640691424, -0.0006169514479125708, 0.0012678006641654962,
        -0.0023365604889281208, 0.003987578845630652, -0.0064235645196067314, 0.009897102171273224,
        -0.014735771656043048, 0.021397186265258904, -0.0305922787748556, 0.04357935256843698,
        -0.06295344913518248, 0.09523021596665757, -0.16279546314550225, 0.4250843421110234,
        0.8152554723618631, -0.20344527985765865, 0.11045952165468288, -0.07113461826198804,
        0.04876095229311181, -0.03415970308502873, 0.023954342027474432, -0.016594951762204505,
        0.011244351154099956, -0.0073840169182144205, 0.004653773496266883, -0.002781261208295835,
        0.001549858822771103, -0.0007840082113006956, 0.00034233119928269617, -0.00011384536045905465,
    ],
    [
        -8.646015847184061e-05, 0.0002918094570740175, -0.0007031524250955152, 0.0014331758741968643,
        -0.0026267165335211616, 0.004464486515129204, -0.007169354651830295, 0.01101945914187319,
        -0.01637682951794817, 0.02375013166853372, -0.03393557997407199, 0.04835491436970912,
        -0.06997150570364508, 0.10633786482256412, -0.18412105734159304, 0.5103803625461216,
        0.7479961691833361, -0.21040679567170298, 0.1162298183016822, -0.07529184332903473,
        0.05172618288758735, -0.03625714280933458, 0.025414428452997948, -0.017586919395427763,
        0.011896360948393992, -0.007794490427036348, 0.004898081927446769, -0.0029161341554770647,
        0.001616725847866409, -0.0008118487532625219, 0.0003502624747810172, -0.0001134966505584561,
    ],
    [
        -9.87758372725191e-05, 0.00032287425227633986, -0.0007676066459517099, 0.0015521554043820994,
        -0.002829350674796237, 0.004789630451774398, -0.007667854699203462, 0.011757618498808716,
        -0.017442509601247217, 0.0252646724373236, -0.036079211363371236, 0.05142668504209583,
        -0.07455290538574459, 0.11385850453963825, -0.1998694173483388, 0.5938348938144504,
        0.6736305263641736, -0.20895082866149198, 0.11728364593807507, -0.07639620447091568,
        0.05259498032070017, -0.03688382568974074, 0.02584152128388674, -0.01786194024619443,
        0.012061564865560133, -0.00788453430830468, 0.004939917265715896, -0.0029296615368528856,
        0.0016157699700436031, -0.0008052756956557336, 0.00034312881407282613, -0.00010814203310616302,
    ],
    [
        -0.00010814203310616302, 0.00034312881407282613, -0.0008052756956557336, 0.0016157699700436031,
        -0.0029296615368528856, 0.004939917265715896, -0.00788453430830468, 0.012061564865560133,
        -0.01786194024619443, 0.02584152128388674, -0.03688382568974074, 0.05259498032070017,
        -0.07639620447091568, 0.11728364593807507, -0.20895082866149198, 0.6736305263641736,
        0.5938348938144504, -0.1998694173483388, 0.11385850453963825, -0.07455290538574463,
        0.05142668504209583, -0.03607921136337128, 0.0252646724373236, -0.017442509601247238,
        0.011757618498808716, -0.007667854699203469, 0.0047896304517744005, -0.00282935067479624,
        0.0015521554043821, -0.0007676066459517113, 0.00032287425227634024, -9.877583727251936e-05,
    ],
    [
        -0.0001134966505584558, 0.0003502624747810167, -0.0008118487532625213, 0.0016167258478664084,
        -0.0029161341554770647, 0.004898081927446763, -0.007794490427036348, 0.011896360948393974,
        -0.017586919395427763, 0.025414428452997927, -0.03625714280933458, 0.05172618288758735,
        -0.07529184332903473, 0.1162298183016822, -0.21040679567170298, 0.7479961691833353,
        0.5103803625461216, -0.18412105734159304, 0.10633786482256412, -0.06997150570364508,
        0.04835491436970912, -0.03393557997407199, 0.02375013166853372, -0.01637682951794817,
        0.01101945914187319, -0.007169354651830295, 0.004464486515129204, -0.0026267165335211616,
        0.0014331758741968643, -0.0007031524250955152, 0.0002918094570740175, -8.646015847184061e-05,
    ],
    [
        -0.00011384536045905465, 0.00034233119928269617, -0.0007840082113006956, 0.001549858822771103,
        -0.002781261208295835, 0.004653773496266883, -0.0073840169182144205, 0.011244351154099956,
        -0.016594951762204505, 0.023954342027474432, -0.03415970308502873, 0.04876095229311181,
        -0.07113461826198804, 0.11045952165468288, -0.20344527985765865, 0.8152554723618631,
        0.4250843421110234, -0.16279546314550225, 0.09523021596665757, -0.06295344913518248,
        0.04357935256843702, -0.03059227877485561, 0.021397186265258904, -0.01473577165604306,
        0.009897102171273235, -0.006423564519606736, 0.003987578845630659, -0.002336560488928122,
        0.0012678006641654973, -0.0006169514479125716, 0.0002524717464069145, -7.226263872565888e-05,
    ],
    [
        -0.000108327567425938, 0.00031789389762247936, -0.0007196728218513186, 0.0014125285243578223,
        -0.002522140302794011, 0.004204414550283723, -0.0066517946309735294, 0.010106766444770333,
        -0.014891384237246107, 0.021472258307840227, -0.03060877181344696, 0.04371988958090296,
        -0.06393276092694283, 0.09989804553717972, -0.1874719703331647, 0.8738731023255941,
        0.3397614640134265, -0.13707557541953935, 0.08114484806659979, -0.05387679023136462,
        0.037355406272538486, -0.02622841487244443, 0.018332906893397883, -0.012609097007771259,
        0.00845295396850634, -0.005472774807184656, 0.0033865736418280594, -0.0019761623827066386,
        0.001066184206044781, -0.0005144949046044454, 0.00020748819162883127, -5.7200781092504215e-05,
    ],
    [
        -9.628284702266641e-05, 0.0002761378692980198, -0.0006182050631989125, 0.0012049310172646851,
        -0.00214091310505993, 0.0035557842238147035, -0.00560963151584834, 0.00850463428444761,
        -0.01251051049830309, 0.018020589698614774, -0.025680160714865254, 0.03670632807542259,
        -0.05381313747512476, 0.08464540084576604, -0.16211647523047504, 0.9224974521886369,
        0.25617529220225127, -0.10819808629208318, 0.06476531899775548, -0.04317878901603715,
        0.029982199568498683, -0.02105433671257107, 0.014706049017402495, -0.010101113292599113,
        0.006758770370672165, -0.004364961200176948, 0.002692344739052822, -0.001564424368938754,
        0.0008391622949440387, -0.00040145540305817895, 0.000159447839237797, -4.219499427853527e-05,
    ],
    [
        -7.731421543398315e-05, 0.0002169860614618945, -0.0004805700192369383, 0.0009303095956496546,
        -0.0016450168024111976, 0.00272228366578865, -0.00428269754924224, 0.006478921621446321,
        -0.009515552040412037, 0.013692929865015548, -0.019507805430721455, 0.027906019814066423,
        -0.04102220468240514, 0.06498275625544757, -0.12725246333879608, 0.9599984717918447,
        0.1759922816670577, -0.07741377150949195, 0.04682160157055781, -0.031337093996885716,
        0.021789426587451588, -0.015302279429675268, 0.010680381610628446, -0.007325964819535918,
        0.0048923975545770515, -0.0031515952002924793, 0.0019375600836701637, -0.0011210046638057058,
        0.0005977570066149793, -0.00028343060206865246, 0.00011078813900222546, -2.8031913204521547e-05,
    ],
    [
        -5.1344400271562384e-05, 0.00014117906121371906, -0.0003094343103411143, 0.0005950468745676616,
        -0.0010472247004489972, 0.0017268539230538432, -0.002709217540523509, 0.004089867097375367,
        -0.005997464529254869, 0.008622155323529165, -0.01228102021555562, 0.017583597849691504,
        -0.025922503499068297, 0.04137294149091822, -0.0830109615667737, 0.9854994473261501,
        0.10073933988574606, -0.04594889134118639, 0.028061917129719446, -0.018850257364596047,
        0.013123601938225557, -0.009216566070237955, 0.006427725682545801, -0.004402755377311795,
        0.0029344343549750694, -0.001885433547647438, 0.0011552796196186794, -0.0006654773479267727,
        0.0003527104843649451, -0.00016571180840398722, 6.369955954437695e-05, -1.5338868439559148e-05,
    ],
    [
        -1.8661276253189395e-05, 5.032535476721663e-05, -0.00010919549883566039, 0.00020862539851188212,
        -0.00036546047829536795, 0.0006005293686917005, -0.0009396057129744139, 0.0014154900961046797,
        -0.002072564019940537, 0.002976866987267436, -0.004239439686105279, 0.006075814306983012,
        -0.008984626890808712, 0.014454770883722585, -0.02978621973169452, 0.9984017443309292,
        0.03176621664611075, -0.014968854009375034, 0.009225236783410116, -0.006218321636340866,
        0.004334250660969994, -0.0030437578936296584, 0.002120984522420068, -0.0014507023184778282,
        0.0009649514768014592, -0.0006183756223045883, 0.00037762049031985536, -0.00021655102177498171,
        0.00011406512721794465, -5.3085626355501405e-05, 2.0051169088573697e-05, -4.5697180381745295e-06,
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    fn dc_gain(table: &[[f64; 5]]) -> f64 {
        table
            .iter()
            .map(|s| (s[0] + s[1] + s[2]) / (1.0 + s[3] + s[4]))
            .product()
    }

    fn poles_inside_unit_circle(table: &[[f64; 5]]) -> bool {
        // For z^2 + a1 z + a2, both roots lie inside the unit circle iff
        // |a2| < 1 and |a1| < 1 + a2.
        table.iter().all(|s| s[4].abs() < 1.0 && s[3].abs() < 1.0 + s[4])
    }

    #[test]
    fn test_all_tables_are_stable() {
        assert!(poles_inside_unit_circle(&SOS_ONE_THIRD_LOWPASS));
        assert!(poles_inside_unit_circle(&SOS_ONE_THIRD_BANDPASS));
        assert!(poles_inside_unit_circle(&SOS_HALF_HIGHPASS));
        assert!(poles_inside_unit_circle(&SOS_DECIMATION_16));
    }

    #[test]
    fn test_lowpass_tables_have_unity_dc_gain() {
        // Elliptic passband ripple leaves the DC gain slightly below 1.
        assert!((dc_gain(&SOS_ONE_THIRD_LOWPASS) - 1.0).abs() < 2e-3);
        assert!((dc_gain(&SOS_DECIMATION_16) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        // Stopband floor is around -60 dB.
        assert!(dc_gain(&SOS_HALF_HIGHPASS).abs() < 2e-3);
        assert!(dc_gain(&SOS_ONE_THIRD_BANDPASS).abs() < 2e-3);
    }

    #[test]
    fn test_half_band_coefficients_are_valid_allpass() {
        for &a in HALF_BAND_PATH0.iter().chain(HALF_BAND_PATH1.iter()) {
            assert!(a > 0.0 && a < 1.0);
        }
    }

    #[test]
    fn test_fir_phases_sum_to_unity() {
        for phase in FIR_UP_16.iter() {
            let sum: f64 = phase.iter().sum();
            assert!((sum - 1.0).abs() < 1e-3, "phase sum {sum}");
        }
    }
}
